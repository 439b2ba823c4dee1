//! Mock key selector for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::gate::{GateError, KeySelector};

#[derive(Debug, Default)]
struct SelectorState {
    selected: bool,
    unavailable: bool,
    failure: Option<String>,
    select_calls: usize,
}

/// Mock implementation of the KeySelector trait.
///
/// Selection succeeds by default. Use [`MockKeySelector::unavailable`] for an
/// environment without a selector, or [`MockKeySelector::fail_with`] to make the
/// dialog itself fail.
#[derive(Debug, Default)]
pub struct MockKeySelector {
    state: Arc<RwLock<SelectorState>>,
}

impl MockKeySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector whose environment cannot run key selection.
    pub fn unavailable() -> Self {
        Self {
            state: Arc::new(RwLock::new(SelectorState {
                unavailable: true,
                ..Default::default()
            })),
        }
    }

    /// A selector that already has a key.
    pub fn preselected() -> Self {
        Self {
            state: Arc::new(RwLock::new(SelectorState {
                selected: true,
                ..Default::default()
            })),
        }
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    /// How many times selection was opened.
    pub async fn select_calls(&self) -> usize {
        self.state.read().await.select_calls
    }
}

#[async_trait]
impl KeySelector for MockKeySelector {
    async fn has_selected_key(&self) -> bool {
        self.state.read().await.selected
    }

    async fn open_select_key(&self) -> Result<(), GateError> {
        let mut state = self.state.write().await;
        state.select_calls += 1;

        if state.unavailable {
            return Err(GateError::Unavailable);
        }
        if let Some(ref message) = state.failure {
            return Err(GateError::Failed(message.clone()));
        }

        state.selected = true;
        Ok(())
    }
}
