//! Redesign orchestrator.
//!
//! Produces one artifact per source image. Kept artifacts short-circuit, everything
//! else goes to the transform service concurrently.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::media::{Artifact, SourceImage};
use crate::style::DesignStyle;
use crate::transform::{ImageTransformer, TransformRequest};

use super::config::RedesignConfig;
use super::types::{RedesignError, TransformFailure};

pub struct RedesignOrchestrator {
    transformer: Arc<dyn ImageTransformer>,
    limiter: Option<Arc<Semaphore>>,
}

impl RedesignOrchestrator {
    pub fn new(config: RedesignConfig, transformer: Arc<dyn ImageTransformer>) -> Self {
        let limiter = (config.max_concurrent_transforms > 0)
            .then(|| Arc::new(Semaphore::new(config.max_concurrent_transforms)));

        Self {
            transformer,
            limiter,
        }
    }

    /// Redesign every source in `style`.
    ///
    /// `prior[i]` pinned with `kept` is returned unchanged at index i. The run fails as a
    /// whole if any transform fails; `prior` is never modified.
    pub async fn run_redesign(
        &self,
        sources: &[SourceImage],
        style: DesignStyle,
        prior: &[Option<Artifact>],
    ) -> Result<Vec<Artifact>, RedesignError> {
        if sources.is_empty() {
            return Err(RedesignError::NoSources);
        }

        let pinned_count = sources
            .iter()
            .enumerate()
            .filter(|(i, _)| Self::pinned(prior, *i).is_some())
            .count();

        info!(
            sources = sources.len(),
            pinned = pinned_count,
            style = %style,
            transformer = self.transformer.name(),
            "Starting redesign run"
        );
        let start = Instant::now();

        let tasks = sources.iter().enumerate().map(|(index, source)| {
            let pinned = Self::pinned(prior, index).cloned();
            async move {
                if let Some(artifact) = pinned {
                    debug!(index, handle = %source.display_handle, "Keeping pinned artifact");
                    return (index, Ok(artifact));
                }

                // Held until the transform finishes.
                let _permit = match &self.limiter {
                    Some(limiter) => limiter.acquire().await.ok(),
                    None => None,
                };

                debug!(index, handle = %source.display_handle, "Requesting transform");
                let result = self
                    .transformer
                    .transform(TransformRequest::redesign(source, style))
                    .await
                    .map(Artifact::fresh);
                (index, result)
            }
        });

        // join_all yields in input order, so index i stays aligned with source i.
        let results = join_all(tasks).await;

        let mut artifacts = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();
        for (index, result) in results {
            match result {
                Ok(artifact) => artifacts.push(artifact),
                Err(error) => {
                    warn!(index, error = %error, "Transform failed");
                    failures.push(TransformFailure { index, error });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                total = sources.len(),
                duration_ms,
                "Redesign run failed"
            );
            return Err(RedesignError::TransformFailed {
                total: sources.len(),
                failures,
            });
        }

        info!(artifacts = artifacts.len(), duration_ms, "Redesign run complete");
        Ok(artifacts)
    }

    fn pinned(prior: &[Option<Artifact>], index: usize) -> Option<&Artifact> {
        prior
            .get(index)
            .and_then(|a| a.as_ref())
            .filter(|a| a.kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockImageTransformer};
    use crate::transform::TransformError;

    fn orchestrator(transformer: &Arc<MockImageTransformer>) -> RedesignOrchestrator {
        RedesignOrchestrator::new(
            RedesignConfig::default(),
            Arc::clone(transformer) as Arc<dyn ImageTransformer>,
        )
    }

    #[tokio::test]
    async fn test_empty_sources_never_contacts_service() {
        let transformer = Arc::new(MockImageTransformer::new());
        let result = orchestrator(&transformer)
            .run_redesign(&[], DesignStyle::Modern, &[])
            .await;

        assert!(matches!(result, Err(RedesignError::NoSources)));
        assert_eq!(transformer.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_unkept_prior_is_regenerated() {
        let transformer = Arc::new(MockImageTransformer::new());
        let sources = fixtures::sources(1);
        let prior = vec![Some(fixtures::artifact(b"old", false))];

        let artifacts = orchestrator(&transformer)
            .run_redesign(&sources, DesignStyle::Japandi, &prior)
            .await
            .unwrap();

        assert_eq!(transformer.call_count().await, 1);
        assert_ne!(artifacts[0].image.bytes, b"old");
        assert!(!artifacts[0].kept);
    }

    #[tokio::test]
    async fn test_prior_longer_than_sources_is_ignored_past_end() {
        let transformer = Arc::new(MockImageTransformer::new());
        let sources = fixtures::sources(1);
        let prior = vec![None, Some(fixtures::artifact(b"stale", true))];

        let artifacts = orchestrator(&transformer)
            .run_redesign(&sources, DesignStyle::Modern, &prior)
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_limit_still_completes_all() {
        let transformer = Arc::new(MockImageTransformer::new());
        let orchestrator = RedesignOrchestrator::new(
            RedesignConfig {
                max_concurrent_transforms: 1,
            },
            Arc::clone(&transformer) as Arc<dyn ImageTransformer>,
        );
        let sources = fixtures::sources(4);

        let artifacts = orchestrator
            .run_redesign(&sources, DesignStyle::Modern, &[])
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 4);
        assert_eq!(transformer.call_count().await, 4);
    }

    #[tokio::test]
    async fn test_failures_are_all_reported() {
        let transformer = Arc::new(MockImageTransformer::new());
        let sources = fixtures::sources(3);
        transformer
            .fail_for(&sources[0].payload.bytes, TransformError::NoImage)
            .await;
        transformer
            .fail_for(
                &sources[2].payload.bytes,
                TransformError::Http("timeout".to_string()),
            )
            .await;

        let err = orchestrator(&transformer)
            .run_redesign(&sources, DesignStyle::Modern, &[])
            .await
            .unwrap_err();

        match err {
            RedesignError::TransformFailed { total, failures } => {
                assert_eq!(total, 3);
                let indices: Vec<usize> = failures.iter().map(|f| f.index).collect();
                assert_eq!(indices, vec![0, 2]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
