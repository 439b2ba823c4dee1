//! Video tour integration tests.
//!
//! Covers input validation, the credential gate, failure classification and polling:
//! gating -> submitting -> polling -> downloading

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_test::assert_ok;

use roomshift_core::{
    orchestrator::TOUR_PROMPT,
    testing::{fixtures, MockKeySelector, MockVideoSynthesizer, MOCK_VIDEO_BYTES},
    CredentialGate, KeySelector, PollPolicy, VideoFailureKind, VideoServiceError,
    VideoSynthesizer, VideoTourConfig, VideoTourOrchestrator, VideoTourPhase,
};

struct TestHarness {
    synthesizer: Arc<MockVideoSynthesizer>,
    selector: Arc<MockKeySelector>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_selector(MockKeySelector::new())
    }

    fn with_selector(selector: MockKeySelector) -> Self {
        Self {
            synthesizer: Arc::new(MockVideoSynthesizer::new()),
            selector: Arc::new(selector),
        }
    }

    fn orchestrator(&self) -> VideoTourOrchestrator {
        VideoTourOrchestrator::new(
            VideoTourConfig::default(),
            Arc::clone(&self.synthesizer) as Arc<dyn VideoSynthesizer>,
            Arc::clone(&self.selector) as Arc<dyn KeySelector>,
        )
        .with_poll_policy(PollPolicy::fixed(Duration::from_millis(2)))
    }
}

fn entity_not_found() -> VideoServiceError {
    VideoServiceError::Api {
        status: 400,
        message: "Requested entity was not found.".to_string(),
    }
}

#[tokio::test]
async fn test_fewer_than_two_references_makes_no_calls() {
    let h = TestHarness::new();
    let mut gate = CredentialGate::default();

    for count in [0, 1] {
        let failure = h
            .orchestrator()
            .run_video_tour(&fixtures::payloads(count), &mut gate)
            .await
            .unwrap_err();
        assert_eq!(failure.kind, VideoFailureKind::NotEnoughInputs);
    }

    assert_eq!(h.selector.select_calls().await, 0);
    assert_eq!(h.synthesizer.submit_count().await, 0);
    assert!(!gate.is_satisfied());
}

#[tokio::test]
async fn test_unsatisfied_gate_selects_once_before_submission() {
    let h = TestHarness::new();
    h.synthesizer.complete_after(0, "mock://videos/1").await;

    let phases = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&phases);
    let orchestrator = h
        .orchestrator()
        .with_phase_callback(Arc::new(move |phase| recorded.lock().unwrap().push(phase)));

    let mut gate = CredentialGate::default();
    assert_ok!(
        orchestrator
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
    );

    assert!(gate.is_satisfied());
    assert_eq!(h.selector.select_calls().await, 1);
    assert_eq!(h.synthesizer.submit_count().await, 1);

    let phases = phases.lock().unwrap().clone();
    assert_eq!(phases[0], VideoTourPhase::Gating);
    assert_eq!(phases[1], VideoTourPhase::Submitting);
}

#[tokio::test]
async fn test_unavailable_selector_blocks_submission() {
    let h = TestHarness::with_selector(MockKeySelector::unavailable());
    let mut gate = CredentialGate::default();

    let failure = h
        .orchestrator()
        .run_video_tour(&fixtures::payloads(3), &mut gate)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, VideoFailureKind::EnvironmentUnsupported);
    assert_eq!(
        failure.message,
        "API Key selection is not available in this environment."
    );
    assert_eq!(h.synthesizer.submit_count().await, 0);
    assert!(!gate.is_satisfied());
}

#[tokio::test]
async fn test_failed_selection_blocks_submission() {
    let h = TestHarness::new();
    h.selector.fail_with("dialog closed").await;
    let mut gate = CredentialGate::default();

    let failure = h
        .orchestrator()
        .run_video_tour(&fixtures::payloads(2), &mut gate)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, VideoFailureKind::Generic);
    assert_eq!(h.synthesizer.submit_count().await, 0);
}

#[tokio::test]
async fn test_credential_failure_resets_gate_and_next_attempt_reselects() {
    let h = TestHarness::new();
    h.synthesizer.fail_next_submit(entity_not_found()).await;
    let mut gate = CredentialGate::new(true);

    let failure = h
        .orchestrator()
        .run_video_tour(&fixtures::payloads(2), &mut gate)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, VideoFailureKind::Credential);
    assert!(failure.message.ends_with("Please select a valid key."));
    assert!(!gate.is_satisfied());
    assert_eq!(h.selector.select_calls().await, 0);

    assert_ok!(
        h.orchestrator()
            .run_video_tour(&fixtures::payloads(2), &mut gate)
            .await
    );
    assert_eq!(h.selector.select_calls().await, 1);
    assert!(gate.is_satisfied());
}

#[tokio::test]
async fn test_other_failures_leave_gate_unchanged() {
    let h = TestHarness::new();
    h.synthesizer
        .fail_next_submit(VideoServiceError::Api {
            status: 400,
            message: "Invalid aspect ratio".to_string(),
        })
        .await;
    let mut gate = CredentialGate::new(true);

    let failure = h
        .orchestrator()
        .run_video_tour(&fixtures::payloads(2), &mut gate)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, VideoFailureKind::Generic);
    assert!(failure.message.contains("Invalid aspect ratio"));
    assert!(gate.is_satisfied());
}

#[tokio::test]
async fn test_polls_until_done_then_downloads_once() {
    let h = TestHarness::new();
    h.synthesizer.complete_after(2, "mock://videos/tour").await;
    let mut gate = CredentialGate::new(true);

    let video = assert_ok!(
        h.orchestrator()
            .run_video_tour(&fixtures::payloads(4), &mut gate)
            .await
    );

    assert_eq!(h.synthesizer.poll_count().await, 3);
    assert_eq!(h.synthesizer.download_count().await, 1);
    assert_eq!(video.bytes, MOCK_VIDEO_BYTES);
    assert_eq!(video.mime_type, "video/mp4");

    let submitted = h.synthesizer.submitted().await;
    assert_eq!(submitted[0].prompt, TOUR_PROMPT);
    assert_eq!(submitted[0].reference_images, fixtures::payloads(3));
}
