//! Mock image transformer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::media::ImagePayload;
use crate::transform::{ImageTransformer, TransformError, TransformRequest};

/// Prefix the mock puts in front of every input to build its output.
pub const REDESIGN_MARKER: &[u8] = b"redesigned:";

/// Mock implementation of the ImageTransformer trait.
///
/// Outputs are deterministic: the input bytes prefixed with [`REDESIGN_MARKER`],
/// returned with the input's MIME type. Failures are keyed by input bytes so a test
/// can fail one source of a batch.
///
/// # Example
///
/// ```rust,ignore
/// use roomshift_core::testing::MockImageTransformer;
///
/// let transformer = MockImageTransformer::new();
/// transformer.fail_for(&source.payload.bytes, TransformError::NoImage).await;
///
/// let result = orchestrator.run_redesign(&sources, style, &[]).await;
/// assert_eq!(transformer.call_count().await, sources.len());
/// ```
#[derive(Debug)]
pub struct MockImageTransformer {
    /// Every request received, in arrival order.
    requests: Arc<RwLock<Vec<TransformRequest>>>,
    /// Errors to return for specific input bytes.
    failures: Arc<RwLock<HashMap<Vec<u8>, TransformError>>>,
    /// Simulated latency per transform.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockImageTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageTransformer {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Output the mock produces for `input`.
    pub fn expected_output(input: &[u8]) -> Vec<u8> {
        [REDESIGN_MARKER, input].concat()
    }

    /// Get all recorded requests.
    pub async fn requests(&self) -> Vec<TransformRequest> {
        self.requests.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Fail every transform whose input equals `bytes`.
    pub async fn fail_for(&self, bytes: &[u8], error: TransformError) {
        self.failures.write().await.insert(bytes.to_vec(), error);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Delay every transform by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }
}

#[async_trait]
impl ImageTransformer for MockImageTransformer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transform(&self, request: TransformRequest) -> Result<ImagePayload, TransformError> {
        self.requests.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.read().await.get(&request.image.bytes) {
            return Err(error.clone());
        }

        Ok(ImagePayload::new(
            Self::expected_output(&request.image.bytes),
            request.image.mime_type,
        ))
    }
}
