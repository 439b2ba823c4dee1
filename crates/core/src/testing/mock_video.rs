//! Mock video synthesizer for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::video::{
    JobHandle, JobStatus, MediaPayload, VideoJobRequest, VideoServiceError, VideoSynthesizer,
};

/// Bytes of every video the mock "downloads".
pub const MOCK_VIDEO_BYTES: &[u8] = b"mock-video";

/// Scripted outcome of the current job.
#[derive(Debug, Clone)]
struct Script {
    /// Successful polls that report pending before the job finishes.
    pending_polls: u32,
    /// Locator reported once the job finishes.
    locator: Option<String>,
}

#[derive(Debug, Default)]
struct Counters {
    submits: usize,
    polls: usize,
    downloads: usize,
    /// Successful polls since the last submission.
    polls_on_job: u32,
}

/// Mock implementation of the VideoSynthesizer trait.
///
/// Provides controllable behavior for testing:
/// - Script how many checks a job stays pending
/// - Queue one-shot submission, poll and download failures
/// - Count calls per operation and record submitted jobs
///
/// By default a job finishes on its first check with a locator.
#[derive(Debug)]
pub struct MockVideoSynthesizer {
    script: Arc<RwLock<Script>>,
    counters: Arc<RwLock<Counters>>,
    submitted: Arc<RwLock<Vec<VideoJobRequest>>>,
    submit_errors: Arc<RwLock<VecDeque<VideoServiceError>>>,
    poll_errors: Arc<RwLock<VecDeque<VideoServiceError>>>,
    download_errors: Arc<RwLock<VecDeque<VideoServiceError>>>,
    submit_delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockVideoSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVideoSynthesizer {
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(Script {
                pending_polls: 0,
                locator: Some("mock://videos/tour.mp4".to_string()),
            })),
            counters: Arc::new(RwLock::new(Counters::default())),
            submitted: Arc::new(RwLock::new(Vec::new())),
            submit_errors: Arc::new(RwLock::new(VecDeque::new())),
            poll_errors: Arc::new(RwLock::new(VecDeque::new())),
            download_errors: Arc::new(RwLock::new(VecDeque::new())),
            submit_delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Report pending for `pending_polls` checks, then finish with `locator`.
    pub async fn complete_after(&self, pending_polls: u32, locator: impl Into<String>) {
        *self.script.write().await = Script {
            pending_polls,
            locator: Some(locator.into()),
        };
    }

    /// Report pending for `pending_polls` checks, then finish without a locator.
    pub async fn complete_without_output_after(&self, pending_polls: u32) {
        *self.script.write().await = Script {
            pending_polls,
            locator: None,
        };
    }

    /// Fail the next submission.
    pub async fn fail_next_submit(&self, error: VideoServiceError) {
        self.submit_errors.write().await.push_back(error);
    }

    /// Fail the next check. Failed checks do not advance the script.
    pub async fn fail_next_poll(&self, error: VideoServiceError) {
        self.poll_errors.write().await.push_back(error);
    }

    pub async fn fail_download(&self, error: VideoServiceError) {
        self.download_errors.write().await.push_back(error);
    }

    /// Delay every submission by `delay`.
    pub async fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.write().await = Some(delay);
    }

    pub async fn submitted(&self) -> Vec<VideoJobRequest> {
        self.submitted.read().await.clone()
    }

    pub async fn submit_count(&self) -> usize {
        self.counters.read().await.submits
    }

    /// Checks made, failed ones included.
    pub async fn poll_count(&self) -> usize {
        self.counters.read().await.polls
    }

    pub async fn download_count(&self) -> usize {
        self.counters.read().await.downloads
    }
}

#[async_trait]
impl VideoSynthesizer for MockVideoSynthesizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: VideoJobRequest) -> Result<JobHandle, VideoServiceError> {
        let delay = *self.submit_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let submits = {
            let mut counters = self.counters.write().await;
            counters.submits += 1;
            counters.polls_on_job = 0;
            counters.submits
        };
        self.submitted.write().await.push(request);

        if let Some(error) = self.submit_errors.write().await.pop_front() {
            return Err(error);
        }

        Ok(JobHandle(format!("operations/mock-{}", submits)))
    }

    async fn poll(&self, _handle: &JobHandle) -> Result<JobStatus, VideoServiceError> {
        let mut counters = self.counters.write().await;
        counters.polls += 1;

        if let Some(error) = self.poll_errors.write().await.pop_front() {
            return Err(error);
        }

        counters.polls_on_job += 1;
        let script = self.script.read().await;
        if counters.polls_on_job <= script.pending_polls {
            return Ok(JobStatus::pending());
        }

        Ok(JobStatus {
            done: true,
            locator: script.locator.clone(),
        })
    }

    async fn download(&self, _locator: &str) -> Result<MediaPayload, VideoServiceError> {
        self.counters.write().await.downloads += 1;

        if let Some(error) = self.download_errors.write().await.pop_front() {
            return Err(error);
        }

        Ok(MediaPayload {
            bytes: MOCK_VIDEO_BYTES.to_vec(),
            mime_type: "video/mp4".to_string(),
        })
    }
}
