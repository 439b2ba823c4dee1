//! Redesign run integration tests.
//!
//! Covers the fan-out over uploaded sources, pinned artifacts and whole-run failure.

use std::sync::Arc;

use tokio_test::assert_ok;

use roomshift_core::{
    testing::{fixtures, MockImageTransformer},
    transform::{redesign_instruction, TransformError},
    DesignStyle, ImageTransformer, RedesignConfig, RedesignError, RedesignOrchestrator,
};

fn orchestrator(transformer: &Arc<MockImageTransformer>) -> RedesignOrchestrator {
    RedesignOrchestrator::new(
        RedesignConfig::default(),
        Arc::clone(transformer) as Arc<dyn ImageTransformer>,
    )
}

#[tokio::test]
async fn test_every_source_is_transformed_once() {
    let transformer = Arc::new(MockImageTransformer::new());
    let sources = fixtures::sources(4);

    let artifacts = assert_ok!(
        orchestrator(&transformer)
            .run_redesign(&sources, DesignStyle::Scandinavian, &[])
            .await
    );

    assert_eq!(transformer.call_count().await, 4);
    assert_eq!(artifacts.len(), 4);
    for (source, artifact) in sources.iter().zip(&artifacts) {
        assert!(!artifact.kept);
        assert_eq!(
            artifact.image.bytes,
            MockImageTransformer::expected_output(&source.payload.bytes)
        );
    }

    let instruction = redesign_instruction(DesignStyle::Scandinavian);
    for request in transformer.requests().await {
        assert_eq!(request.instruction, instruction);
    }
}

#[tokio::test]
async fn test_kept_artifacts_skip_the_service() {
    let transformer = Arc::new(MockImageTransformer::new());
    let sources = fixtures::sources(3);
    let pinned = fixtures::artifact(b"pinned", true);
    let prior = vec![None, Some(pinned.clone()), Some(fixtures::artifact(b"loose", false))];

    let artifacts = assert_ok!(
        orchestrator(&transformer)
            .run_redesign(&sources, DesignStyle::Industrial, &prior)
            .await
    );

    assert_eq!(transformer.call_count().await, 2);
    assert_eq!(artifacts[1], pinned);
    assert_ne!(artifacts[2].image.bytes, b"loose");

    let transformed: Vec<Vec<u8>> = transformer
        .requests()
        .await
        .into_iter()
        .map(|r| r.image.bytes)
        .collect();
    assert!(!transformed.contains(&sources[1].payload.bytes));
}

#[tokio::test]
async fn test_all_kept_makes_no_calls() {
    let transformer = Arc::new(MockImageTransformer::new());
    let sources = fixtures::sources(2);
    let prior = vec![
        Some(fixtures::artifact(b"a", true)),
        Some(fixtures::artifact(b"b", true)),
    ];

    let artifacts = assert_ok!(
        orchestrator(&transformer)
            .run_redesign(&sources, DesignStyle::Modern, &prior)
            .await
    );

    assert_eq!(transformer.call_count().await, 0);
    assert_eq!(artifacts[0].image.bytes, b"a");
    assert_eq!(artifacts[1].image.bytes, b"b");
}

#[tokio::test]
async fn test_single_failure_fails_the_run() {
    let transformer = Arc::new(MockImageTransformer::new());
    let sources = fixtures::sources(3);
    transformer
        .fail_for(
            &sources[1].payload.bytes,
            TransformError::Api {
                status: 500,
                message: "internal".to_string(),
            },
        )
        .await;
    let prior = vec![Some(fixtures::artifact(b"keep-me", true)), None, None];

    let err = orchestrator(&transformer)
        .run_redesign(&sources, DesignStyle::Bohemian, &prior)
        .await
        .unwrap_err();

    match err {
        RedesignError::TransformFailed { total, failures } => {
            assert_eq!(total, 3);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // The caller's artifacts are untouched.
    assert_eq!(prior[0].as_ref().unwrap().image.bytes, b"keep-me");
}
