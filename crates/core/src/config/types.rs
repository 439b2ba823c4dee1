use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::{RedesignConfig, VideoTourConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub redesign: RedesignConfig,
    #[serde(default)]
    pub video: VideoTourConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Generative media API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key used for image transforms.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            image_model: default_image_model(),
            video_model: default_video_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-generate-preview".to_string()
}

fn default_timeout() -> u32 {
    120
}

/// Identity token persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> PathBuf {
    PathBuf::from("roomshift-token")
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub gemini: SanitizedGeminiConfig,
    pub redesign: RedesignConfig,
    pub video: SanitizedVideoConfig,
    pub identity: IdentityConfig,
}

/// Sanitized API config (key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeminiConfig {
    pub api_base: String,
    pub api_key_configured: bool,
    pub image_model: String,
    pub video_model: String,
    pub timeout_secs: u32,
}

/// Sanitized video config (key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedVideoConfig {
    pub poll_interval_ms: u64,
    pub backoff_multiplier: f64,
    pub max_poll_interval_ms: u64,
    pub timeout_secs: u64,
    pub max_poll_retries: u32,
    pub max_reference_images: usize,
    pub resolution: String,
    pub aspect_ratio: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            gemini: SanitizedGeminiConfig {
                api_base: config.gemini.api_base.clone(),
                api_key_configured: config
                    .gemini
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                image_model: config.gemini.image_model.clone(),
                video_model: config.gemini.video_model.clone(),
                timeout_secs: config.gemini.timeout_secs,
            },
            redesign: config.redesign.clone(),
            video: SanitizedVideoConfig {
                poll_interval_ms: config.video.poll_interval_ms,
                backoff_multiplier: config.video.backoff_multiplier,
                max_poll_interval_ms: config.video.max_poll_interval_ms,
                timeout_secs: config.video.timeout_secs,
                max_poll_retries: config.video.max_poll_retries,
                max_reference_images: config.video.max_reference_images,
                resolution: config.video.resolution.clone(),
                aspect_ratio: config.video.aspect_ratio.clone(),
                api_key_configured: config.video_api_key().is_some(),
            },
            identity: config.identity.clone(),
        }
    }
}

impl Config {
    /// Key offered by key selection for video jobs.
    /// Falls back to the image transform key when no dedicated key is set.
    pub fn video_api_key(&self) -> Option<&str> {
        self.video
            .api_key
            .as_deref()
            .or(self.gemini.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }
}
