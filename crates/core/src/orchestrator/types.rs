//! Types for the orchestrators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::TransformError;
use crate::video::MediaPayload;

/// One failed index of a redesign run.
#[derive(Debug, Clone)]
pub struct TransformFailure {
    pub index: usize,
    pub error: TransformError,
}

/// Errors that fail a redesign run as a whole.
#[derive(Debug, Clone, Error)]
pub enum RedesignError {
    /// Nothing was uploaded.
    #[error("Please upload at least one image.")]
    NoSources,

    /// At least one transform failed. Lists every failure.
    #[error("{} of {total} redesigns failed: {}", .failures.len(), summarize(.failures))]
    TransformFailed {
        total: usize,
        failures: Vec<TransformFailure>,
    },
}

fn summarize(failures: &[TransformFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("image {}: {}", f.index + 1, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Classification of a failed video tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFailureKind {
    /// Fewer than two references were supplied.
    NotEnoughInputs,
    /// The environment cannot perform key selection.
    EnvironmentUnsupported,
    /// The selected key lacks access. The gate is reset.
    Credential,
    /// The job did not finish within the poll policy's timeout.
    Timeout,
    Generic,
}

/// Typed outcome of a failed video tour, carrying a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct VideoFailure {
    pub kind: VideoFailureKind,
    pub message: String,
}

impl VideoFailure {
    pub fn new(kind: VideoFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_enough_inputs() -> Self {
        Self::new(
            VideoFailureKind::NotEnoughInputs,
            "At least two redesigned images are needed to create a tour.",
        )
    }

    pub fn environment_unsupported() -> Self {
        Self::new(
            VideoFailureKind::EnvironmentUnsupported,
            "API Key selection is not available in this environment.",
        )
    }

    pub fn credential() -> Self {
        Self::new(
            VideoFailureKind::Credential,
            "API Key is invalid or missing permissions for the video API. Please select a valid key.",
        )
    }

    pub fn timeout(secs: u64) -> Self {
        Self::new(
            VideoFailureKind::Timeout,
            format!("Video generation did not finish within {} seconds.", secs),
        )
    }

    pub fn generic(reason: impl fmt::Display) -> Self {
        Self::new(
            VideoFailureKind::Generic,
            format!("Failed to generate video tour: {}", reason),
        )
    }

    pub fn missing_output() -> Self {
        Self::new(
            VideoFailureKind::Generic,
            "Video generation succeeded but no download link was provided.",
        )
    }

    /// Whether retrying will run key selection again.
    pub fn invites_key_reselection(&self) -> bool {
        self.kind == VideoFailureKind::Credential
    }
}

/// Whether the one-time key selection has been completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialGate {
    satisfied: bool,
}

impl CredentialGate {
    pub fn new(satisfied: bool) -> Self {
        Self { satisfied }
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn mark_satisfied(&mut self) {
        self.satisfied = true;
    }

    /// Forces key selection on the next attempt.
    pub fn reset(&mut self) {
        self.satisfied = false;
    }
}

/// Active phase of a running video tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum VideoTourPhase {
    Gating,
    Submitting,
    Polling { attempts: u32 },
    Downloading,
}

impl fmt::Display for VideoTourPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoTourPhase::Gating => f.write_str("selecting key"),
            VideoTourPhase::Submitting => f.write_str("submitting job"),
            VideoTourPhase::Polling { attempts } => {
                write!(f, "waiting for job ({} checks)", attempts)
            }
            VideoTourPhase::Downloading => f.write_str("downloading video"),
        }
    }
}

/// A downloaded video held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl VideoRef {
    pub fn from_media(media: MediaPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            bytes: media.bytes,
            mime_type: media.mime_type,
            created_at: Utc::now(),
        }
    }
}

/// State of the session's video job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VideoJobState {
    #[default]
    Idle,
    Running { phase: VideoTourPhase },
    Succeeded { video: VideoRef },
    Failed { failure: VideoFailure },
}

impl VideoJobState {
    pub fn is_running(&self) -> bool {
        matches!(self, VideoJobState::Running { .. })
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            VideoJobState::Idle => "idle",
            VideoJobState::Running { .. } => "running",
            VideoJobState::Succeeded { .. } => "succeeded",
            VideoJobState::Failed { .. } => "failed",
        }
    }
}
