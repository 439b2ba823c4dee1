//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_POLL_RETRIES: u32 = 2;

/// Configuration for redesign runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedesignConfig {
    /// Maximum transforms in flight at once (0 = unlimited).
    #[serde(default)]
    pub max_concurrent_transforms: usize,
}

/// Configuration for video tour jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTourConfig {
    /// Wait before each status check (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Growth factor applied to the wait after each pending check.
    /// 1.0 keeps a fixed interval.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound for the wait between checks (milliseconds).
    #[serde(default = "default_max_poll_interval")]
    pub max_poll_interval_ms: u64,

    /// Give up on a job after this many seconds (0 = wait forever).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Consecutive transient poll failures tolerated before the job fails.
    #[serde(default = "default_max_poll_retries")]
    pub max_poll_retries: u32,

    /// How many artifacts are sent as reference images.
    #[serde(default = "default_max_reference_images")]
    pub max_reference_images: usize,

    #[serde(default = "default_resolution")]
    pub resolution: String,

    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// Key offered by key selection. Falls back to `gemini.api_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_poll_interval() -> u64 {
    10_000 // 10 seconds
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_max_poll_interval() -> u64 {
    60_000
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_max_poll_retries() -> u32 {
    DEFAULT_POLL_RETRIES
}

fn default_max_reference_images() -> usize {
    3
}

fn default_resolution() -> String {
    "720p".to_string()
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

impl Default for VideoTourConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            backoff_multiplier: default_backoff_multiplier(),
            max_poll_interval_ms: default_max_poll_interval(),
            timeout_secs: default_timeout(),
            max_poll_retries: default_max_poll_retries(),
            max_reference_images: default_max_reference_images(),
            resolution: default_resolution(),
            aspect_ratio: default_aspect_ratio(),
            api_key: None,
        }
    }
}

impl VideoTourConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            backoff_multiplier: self.backoff_multiplier.max(1.0),
            max_interval: Duration::from_millis(self.max_poll_interval_ms.max(self.poll_interval_ms)),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            max_retries: self.max_poll_retries,
        }
    }
}

/// How a running job is watched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff_multiplier: f64,
    pub max_interval: Duration,
    /// `None` polls until the job reports completion.
    pub timeout: Option<Duration>,
    /// Transient poll errors tolerated in a row.
    pub max_retries: u32,
}

impl PollPolicy {
    /// A fixed interval with no timeout.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            backoff_multiplier: 1.0,
            max_interval: interval,
            timeout: None,
            max_retries: DEFAULT_POLL_RETRIES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait to use after `current`, never above `max_interval`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_multiplier)
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}
