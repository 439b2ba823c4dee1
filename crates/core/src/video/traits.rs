//! Trait definitions for the video module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::ImagePayload;

/// Errors reported by the video synthesis service.
#[derive(Debug, Clone, Error)]
pub enum VideoServiceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    /// The job itself finished with an error.
    #[error("Operation failed: {message}")]
    Operation { code: Option<u16>, message: String },

    #[error("Failed to download video: {status} - {message}")]
    Download { status: u16, message: String },

    #[error("No video API key selected")]
    NotConfigured,
}

/// A video generation job submission.
#[derive(Debug, Clone)]
pub struct VideoJobRequest {
    pub prompt: String,
    /// Images anchoring the visual content of the video.
    pub reference_images: Vec<ImagePayload>,
    pub number_of_videos: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

/// Opaque identifier of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle(pub String);

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one status check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStatus {
    pub done: bool,
    /// Where to fetch the produced video, once done.
    pub locator: Option<String>,
}

impl JobStatus {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn finished(locator: impl Into<String>) -> Self {
        Self {
            done: true,
            locator: Some(locator.into()),
        }
    }
}

/// Downloaded media bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// External long-running video synthesis service.
#[async_trait]
pub trait VideoSynthesizer: Send + Sync {
    /// Name of this implementation for logging.
    fn name(&self) -> &str;

    /// Submit a job and return its handle.
    async fn submit(&self, request: VideoJobRequest) -> Result<JobHandle, VideoServiceError>;

    /// Check the status of a submitted job.
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, VideoServiceError>;

    /// Fetch the media found at `locator`.
    async fn download(&self, locator: &str) -> Result<MediaPayload, VideoServiceError>;
}
