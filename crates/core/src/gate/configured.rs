//! Key selection backed by configuration.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::traits::{GateError, KeySelector};

/// Shared slot holding the currently selected video API key.
///
/// The video client reads it on every request, so a new selection takes effect on the
/// next job without rebuilding the client.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyHandle {
    inner: Arc<RwLock<Option<String>>>,
}

impl ApiKeyHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(key.into()))),
        }
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, key: impl Into<String>) {
        *self.inner.write().await = Some(key.into());
    }
}

/// Selects the key found in configuration into an [`ApiKeyHandle`].
///
/// Without a configured key selection is [`GateError::Unavailable`].
pub struct ConfiguredKeySelector {
    offered: Option<String>,
    handle: ApiKeyHandle,
}

impl ConfiguredKeySelector {
    pub fn new(offered: Option<String>, handle: ApiKeyHandle) -> Self {
        Self {
            offered: offered.filter(|k| !k.is_empty()),
            handle,
        }
    }
}

#[async_trait]
impl KeySelector for ConfiguredKeySelector {
    async fn has_selected_key(&self) -> bool {
        self.handle.get().await.is_some()
    }

    async fn open_select_key(&self) -> Result<(), GateError> {
        let key = self.offered.as_ref().ok_or(GateError::Unavailable)?;
        self.handle.set(key.clone()).await;
        info!("Video API key selected from configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_configured_key() {
        let handle = ApiKeyHandle::new();
        let selector = ConfiguredKeySelector::new(Some("veo-key".to_string()), handle.clone());

        assert!(!selector.has_selected_key().await);
        selector.open_select_key().await.unwrap();
        assert!(selector.has_selected_key().await);
        assert_eq!(handle.get().await.as_deref(), Some("veo-key"));
    }

    #[tokio::test]
    async fn test_select_without_key_is_unavailable() {
        let selector = ConfiguredKeySelector::new(Some(String::new()), ApiKeyHandle::new());
        assert_eq!(selector.open_select_key().await, Err(GateError::Unavailable));
        assert!(!selector.has_selected_key().await);
    }
}
