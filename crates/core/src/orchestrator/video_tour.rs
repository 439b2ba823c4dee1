//! Video tour orchestrator.
//!
//! Drives one job through `Gating -> Submitting -> Polling -> Downloading`. Any phase
//! may end in a typed [`VideoFailure`]. The caller guarantees single flight.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::gate::{GateError, KeySelector};
use crate::media::ImagePayload;
use crate::video::{JobHandle, JobStatus, VideoJobRequest, VideoServiceError, VideoSynthesizer};

use super::classify::{is_credential_failure, is_transient};
use super::config::{PollPolicy, VideoTourConfig};
use super::types::{CredentialGate, VideoFailure, VideoRef, VideoTourPhase};

/// Prompt sent with every video job.
pub const TOUR_PROMPT: &str = "Create a smooth, cinematic video tour of an apartment, \
    transitioning through these rooms. Pan and zoom gently to give a sense of walking \
    through the space.";

/// Callback invoked on every phase change.
pub type PhaseCallback = Arc<dyn Fn(VideoTourPhase) + Send + Sync>;

pub struct VideoTourOrchestrator {
    config: VideoTourConfig,
    poll_policy: PollPolicy,
    synthesizer: Arc<dyn VideoSynthesizer>,
    key_selector: Arc<dyn KeySelector>,
    phase_callback: Option<PhaseCallback>,
}

impl VideoTourOrchestrator {
    pub fn new(
        config: VideoTourConfig,
        synthesizer: Arc<dyn VideoSynthesizer>,
        key_selector: Arc<dyn KeySelector>,
    ) -> Self {
        let poll_policy = config.poll_policy();
        Self {
            config,
            poll_policy,
            synthesizer,
            key_selector,
            phase_callback: None,
        }
    }

    /// Override the poll policy derived from configuration.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn with_phase_callback(mut self, callback: PhaseCallback) -> Self {
        self.phase_callback = Some(callback);
        self
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll_policy
    }

    fn report(&self, phase: VideoTourPhase) {
        debug!(phase = %phase, "Video tour phase");
        if let Some(ref callback) = self.phase_callback {
            callback(phase);
        }
    }

    /// Produce a video tour from `artifacts`.
    ///
    /// Runs key selection at most once if `gate` is unsatisfied. A credential failure
    /// during submission or polling resets `gate`; every other failure leaves it as is.
    pub async fn run_video_tour(
        &self,
        artifacts: &[ImagePayload],
        gate: &mut CredentialGate,
    ) -> Result<VideoRef, VideoFailure> {
        if artifacts.len() < 2 {
            debug!(artifacts = artifacts.len(), "Not enough artifacts for a tour");
            return Err(VideoFailure::not_enough_inputs());
        }

        if !gate.is_satisfied() {
            self.report(VideoTourPhase::Gating);
            match self.key_selector.open_select_key().await {
                Ok(()) => {
                    info!("Key selection completed");
                    gate.mark_satisfied();
                }
                Err(GateError::Unavailable) => {
                    warn!("Key selection unavailable in this environment");
                    return Err(VideoFailure::environment_unsupported());
                }
                Err(e) => {
                    warn!(error = %e, "Key selection failed");
                    return Err(VideoFailure::generic(e));
                }
            }
        }

        self.report(VideoTourPhase::Submitting);
        let request = self.build_request(artifacts);
        info!(
            references = request.reference_images.len(),
            synthesizer = self.synthesizer.name(),
            "Submitting video tour job"
        );
        let handle = self
            .synthesizer
            .submit(request)
            .await
            .map_err(|e| Self::classify(e, gate))?;
        info!(job = %handle, "Video tour job submitted");

        let status = self.wait_for_completion(&handle, gate).await?;

        let locator = status.locator.ok_or_else(|| {
            warn!(job = %handle, "Job finished without a download locator");
            VideoFailure::missing_output()
        })?;

        self.report(VideoTourPhase::Downloading);
        let media = self.synthesizer.download(&locator).await.map_err(|e| {
            warn!(job = %handle, error = %e, "Video download failed");
            VideoFailure::generic(e)
        })?;

        let video = VideoRef::from_media(media);
        info!(
            job = %handle,
            video = %video.id,
            bytes = video.bytes.len(),
            "Video tour ready"
        );
        Ok(video)
    }

    fn build_request(&self, artifacts: &[ImagePayload]) -> VideoJobRequest {
        VideoJobRequest {
            prompt: TOUR_PROMPT.to_string(),
            reference_images: artifacts
                .iter()
                .take(self.config.max_reference_images)
                .cloned()
                .collect(),
            number_of_videos: 1,
            resolution: self.config.resolution.clone(),
            aspect_ratio: self.config.aspect_ratio.clone(),
        }
    }

    /// Sleep, check, repeat until the job reports completion or the policy gives up.
    async fn wait_for_completion(
        &self,
        handle: &JobHandle,
        gate: &mut CredentialGate,
    ) -> Result<JobStatus, VideoFailure> {
        let policy = self.poll_policy;
        let started = Instant::now();
        let mut interval = policy.interval;
        let mut attempts = 0u32;
        let mut consecutive_errors = 0u32;

        loop {
            let wait = match policy.timeout {
                Some(timeout) => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        warn!(job = %handle, attempts, "Video job timed out");
                        return Err(VideoFailure::timeout(timeout.as_secs()));
                    }
                    interval.min(timeout - elapsed)
                }
                None => interval,
            };

            tokio::time::sleep(wait).await;
            attempts += 1;
            self.report(VideoTourPhase::Polling { attempts });

            match self.synthesizer.poll(handle).await {
                Ok(status) if status.done => {
                    info!(job = %handle, attempts, "Video job finished");
                    return Ok(status);
                }
                Ok(_) => {
                    consecutive_errors = 0;
                    debug!(job = %handle, attempts, "Video job still running");
                }
                Err(e) if is_transient(&e) && consecutive_errors < policy.max_retries => {
                    consecutive_errors += 1;
                    warn!(
                        job = %handle,
                        error = %e,
                        retry = consecutive_errors,
                        "Transient poll failure, retrying"
                    );
                }
                Err(e) => return Err(Self::classify(e, gate)),
            }

            interval = policy.next_interval(interval);
        }
    }

    fn classify(error: VideoServiceError, gate: &mut CredentialGate) -> VideoFailure {
        if is_credential_failure(&error) {
            warn!(error = %error, "Video job rejected for credentials, resetting key selection");
            gate.reset();
            VideoFailure::credential()
        } else {
            warn!(error = %error, "Video job failed");
            VideoFailure::generic(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::orchestrator::VideoFailureKind;
    use crate::testing::{fixtures, MockKeySelector, MockVideoSynthesizer};

    fn orchestrator(
        synthesizer: &Arc<MockVideoSynthesizer>,
        selector: &Arc<MockKeySelector>,
    ) -> VideoTourOrchestrator {
        VideoTourOrchestrator::new(
            VideoTourConfig::default(),
            Arc::clone(synthesizer) as Arc<dyn VideoSynthesizer>,
            Arc::clone(selector) as Arc<dyn KeySelector>,
        )
        .with_poll_policy(PollPolicy::fixed(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_reference_images_are_capped() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(0, "https://files.example/v").await;

        let mut gate = CredentialGate::new(true);
        orchestrator(&synthesizer, &selector)
            .run_video_tour(&fixtures::payloads(5), &mut gate)
            .await
            .unwrap();

        let submitted = synthesizer.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].reference_images.len(), 3);
        assert_eq!(submitted[0].number_of_videos, 1);
        assert_eq!(submitted[0].resolution, "720p");
        assert_eq!(submitted[0].aspect_ratio, "16:9");
        assert_eq!(submitted[0].prompt, TOUR_PROMPT);
    }

    #[tokio::test]
    async fn test_satisfied_gate_skips_selection() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(0, "https://files.example/v").await;

        let mut gate = CredentialGate::new(true);
        orchestrator(&synthesizer, &selector)
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap();

        assert_eq!(selector.select_calls().await, 0);
    }

    #[tokio::test]
    async fn test_missing_locator_is_generic_failure() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_without_output_after(1).await;

        let mut gate = CredentialGate::new(true);
        let failure = orchestrator(&synthesizer, &selector)
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap_err();

        assert_eq!(failure, VideoFailure::missing_output());
        assert_eq!(synthesizer.download_count().await, 0);
        assert!(gate.is_satisfied());
    }

    #[tokio::test]
    async fn test_download_failure_is_generic() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(0, "https://files.example/v").await;
        synthesizer
            .fail_download(VideoServiceError::Download {
                status: 404,
                message: "Not Found".to_string(),
            })
            .await;

        let mut gate = CredentialGate::new(true);
        let failure = orchestrator(&synthesizer, &selector)
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap_err();

        assert_eq!(failure.kind, VideoFailureKind::Generic);
        assert!(gate.is_satisfied());
    }

    #[tokio::test]
    async fn test_poll_timeout() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(u32::MAX, "https://files.example/v").await;

        let orchestrator = orchestrator(&synthesizer, &selector).with_poll_policy(
            PollPolicy::fixed(Duration::from_millis(5)).with_timeout(Duration::from_millis(30)),
        );

        let mut gate = CredentialGate::new(true);
        let failure = orchestrator
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap_err();

        assert_eq!(failure.kind, VideoFailureKind::Timeout);
        assert!(synthesizer.poll_count().await >= 1);
        assert_eq!(synthesizer.download_count().await, 0);
    }

    #[tokio::test]
    async fn test_transient_poll_error_is_retried() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(1, "https://files.example/v").await;
        synthesizer
            .fail_next_poll(VideoServiceError::Http("connection reset".to_string()))
            .await;

        let mut gate = CredentialGate::new(true);
        let video = orchestrator(&synthesizer, &selector)
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap();

        assert_eq!(video.mime_type, "video/mp4");
        assert_eq!(synthesizer.poll_count().await, 3);
    }

    #[tokio::test]
    async fn test_credential_failure_during_poll_resets_gate() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(3, "https://files.example/v").await;
        synthesizer
            .fail_next_poll(VideoServiceError::Operation {
                code: Some(404),
                message: "Requested entity was not found.".to_string(),
            })
            .await;

        let mut gate = CredentialGate::new(true);
        let failure = orchestrator(&synthesizer, &selector)
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap_err();

        assert_eq!(failure.kind, VideoFailureKind::Credential);
        assert!(!gate.is_satisfied());
    }

    #[tokio::test]
    async fn test_phase_callback_sequence() {
        let synthesizer = Arc::new(MockVideoSynthesizer::new());
        let selector = Arc::new(MockKeySelector::new());
        synthesizer.complete_after(1, "https://files.example/v").await;

        let phases = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&phases);
        let orchestrator = orchestrator(&synthesizer, &selector).with_phase_callback(Arc::new(
            move |phase| recorded.lock().unwrap().push(phase),
        ));

        let mut gate = CredentialGate::default();
        orchestrator
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
            .unwrap();

        let phases = phases.lock().unwrap().clone();
        assert_eq!(
            phases,
            vec![
                VideoTourPhase::Gating,
                VideoTourPhase::Submitting,
                VideoTourPhase::Polling { attempts: 1 },
                VideoTourPhase::Polling { attempts: 2 },
                VideoTourPhase::Downloading,
            ]
        );
    }
}
