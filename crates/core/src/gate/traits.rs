use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// The environment has no way to select a key.
    #[error("API Key selection is not available in this environment")]
    Unavailable,

    #[error("Key selection failed: {0}")]
    Failed(String),
}

/// Environment capability that selects the key used for video jobs.
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// Whether a key has already been selected.
    async fn has_selected_key(&self) -> bool;

    /// Run the selection step.
    async fn open_select_key(&self) -> Result<(), GateError>;
}
