use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::identity::{IdentityError, UserIdentity};
use crate::media::Artifact;
use crate::orchestrator::{RedesignError, VideoFailure, VideoJobState, VideoTourPhase};
use crate::style::DesignStyle;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A redesign is already running")]
    RedesignInProgress,

    #[error("A video tour is already being generated")]
    VideoInProgress,

    /// A new upload replaced the batch while the job was running.
    #[error("The uploaded images changed while the job was running; the result was discarded")]
    Superseded,

    #[error(transparent)]
    Redesign(#[from] RedesignError),

    #[error(transparent)]
    Video(#[from] VideoFailure),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// A state change, delivered to the update callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { email: String },
    SignedOut,
    Uploaded { count: usize },
    StyleSelected { style: DesignStyle },
    RedesignStarted,
    RedesignFinished { ok: bool },
    KeepToggled { index: usize, kept: bool },
    VideoPhase { phase: VideoTourPhase },
    VideoFinished { state: String },
}

/// Callback invoked after every state change.
pub type SessionUpdateCallback = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Read-only view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<UserIdentity>,
    pub style: DesignStyle,
    /// Display handles of the uploaded sources, in upload order.
    pub sources: Vec<String>,
    /// One slot per source; `None` until a redesign produced it.
    pub artifacts: Vec<Option<Artifact>>,
    pub redesigning: bool,
    pub error: Option<String>,
    pub video: VideoJobState,
    pub key_selected: bool,
    pub generation: u64,
}

impl SessionSnapshot {
    /// Artifacts that exist, with their index.
    pub fn present_artifacts(&self) -> impl Iterator<Item = (usize, &Artifact)> {
        self.artifacts
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_ref().map(|a| (i, a)))
    }
}
