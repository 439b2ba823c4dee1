use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::gate::KeySelector;
use crate::identity::{decode_token, TokenStore, UserIdentity};
use crate::media::{Artifact, ImagePayload, SourceImage};
use crate::orchestrator::{
    CredentialGate, PhaseCallback, RedesignOrchestrator, VideoFailure, VideoJobState, VideoRef,
    VideoTourOrchestrator, VideoTourPhase,
};
use crate::style::DesignStyle;

use super::types::{SessionError, SessionEvent, SessionSnapshot, SessionUpdateCallback};

/// A tour needs at least this many redesigned images.
const MIN_TOUR_REFERENCES: usize = 2;

#[derive(Debug, Default)]
struct SessionState {
    user: Option<UserIdentity>,
    sources: Vec<SourceImage>,
    artifacts: Vec<Option<Artifact>>,
    style: DesignStyle,
    redesigning: bool,
    error: Option<String>,
    video: VideoJobState,
    gate: CredentialGate,
    /// Bumped on every upload.
    generation: u64,
}

/// Drives one user's session.
///
/// All mutations go through `state`; the lock is never held across an await. Long
/// running operations copy what they need, release the lock, and re-acquire it to
/// apply their result.
pub struct SessionController {
    state: Arc<RwLock<SessionState>>,
    redesigner: RedesignOrchestrator,
    video: VideoTourOrchestrator,
    key_selector: Arc<dyn KeySelector>,
    tokens: Arc<dyn TokenStore>,
    phase_tx: Arc<watch::Sender<Option<VideoTourPhase>>>,
    update_callback: Option<SessionUpdateCallback>,
}

impl SessionController {
    /// Create a controller.
    ///
    /// Installs its own phase callback on `video`, replacing any set before.
    pub fn new(
        redesigner: RedesignOrchestrator,
        video: VideoTourOrchestrator,
        key_selector: Arc<dyn KeySelector>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(None);
        let phase_tx = Arc::new(phase_tx);
        let video = video.with_phase_callback(phase_forwarder(Arc::clone(&phase_tx), None));

        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            redesigner,
            video,
            key_selector,
            tokens,
            phase_tx,
            update_callback: None,
        }
    }

    /// Set a callback for state changes.
    pub fn with_update_callback(mut self, callback: SessionUpdateCallback) -> Self {
        self.video = self.video.with_phase_callback(phase_forwarder(
            Arc::clone(&self.phase_tx),
            Some(Arc::clone(&callback)),
        ));
        self.update_callback = Some(callback);
        self
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(ref callback) = self.update_callback {
            callback(event);
        }
    }

    /// Restore the persisted identity and refresh the credential gate.
    ///
    /// A stored token that no longer decodes is removed.
    pub async fn init(&self) -> Result<Option<UserIdentity>, SessionError> {
        let user = match self.tokens.load().await? {
            Some(token) => match decode_token(&token) {
                Ok(user) => {
                    info!(email = %user.email, "Restored signed-in user");
                    Some(user)
                }
                Err(e) => {
                    warn!(error = %e, "Stored identity token is invalid, removing it");
                    self.tokens.clear().await?;
                    None
                }
            },
            None => None,
        };

        self.state.write().await.user = user.clone();
        self.refresh_gate().await;

        if let Some(ref user) = user {
            self.notify(SessionEvent::SignedIn {
                email: user.email.clone(),
            });
        }
        Ok(user)
    }

    /// Mark the gate satisfied if the environment already has a key selected.
    async fn refresh_gate(&self) {
        let selected = self.key_selector.has_selected_key().await;
        debug!(selected, "Refreshed credential gate");
        self.state.write().await.gate = CredentialGate::new(selected);
    }

    /// Sign in with an identity token and persist it.
    pub async fn sign_in(&self, token: &str) -> Result<UserIdentity, SessionError> {
        let user = decode_token(token)?;
        self.tokens.save(token.trim()).await?;

        self.state.write().await.user = Some(user.clone());
        self.refresh_gate().await;

        info!(email = %user.email, "User signed in");
        self.notify(SessionEvent::SignedIn {
            email: user.email.clone(),
        });
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.tokens.clear().await?;
        self.state.write().await.user = None;

        info!("User signed out");
        self.notify(SessionEvent::SignedOut);
        Ok(())
    }

    /// Replace the uploaded sources.
    ///
    /// Every artifact is dropped, kept ones included. Results of jobs started for the
    /// previous batch are discarded when they arrive. A running video job keeps its
    /// state until it finishes.
    pub async fn upload(&self, batch: Vec<SourceImage>) {
        let count = batch.len();
        {
            let mut state = self.state.write().await;
            state.artifacts = vec![None; count];
            state.sources = batch;
            state.error = None;
            if !state.video.is_running() {
                state.video = VideoJobState::Idle;
            }
            state.generation += 1;
            info!(count, generation = state.generation, "Uploaded new batch");
        }
        self.notify(SessionEvent::Uploaded { count });
    }

    pub async fn select_style(&self, style: DesignStyle) {
        self.state.write().await.style = style;
        debug!(style = %style, "Style selected");
        self.notify(SessionEvent::StyleSelected { style });
    }

    /// Redesign the current batch in the selected style.
    ///
    /// Returns the number of artifacts. On failure the previous artifacts stay in place
    /// and the error is recorded on the session. A finished video tour is cleared when
    /// the run starts. Keep flags toggled while the run is in flight are honoured.
    pub async fn redesign(&self) -> Result<usize, SessionError> {
        let (sources, prior, style, generation) = {
            let mut state = self.state.write().await;
            if state.redesigning {
                return Err(SessionError::RedesignInProgress);
            }
            state.redesigning = true;
            state.error = None;
            if !state.video.is_running() {
                state.video = VideoJobState::Idle;
            }
            (
                state.sources.clone(),
                state.artifacts.clone(),
                state.style,
                state.generation,
            )
        };
        self.notify(SessionEvent::RedesignStarted);

        let result = self.redesigner.run_redesign(&sources, style, &prior).await;

        let outcome = {
            let mut state = self.state.write().await;
            state.redesigning = false;

            if state.generation != generation {
                info!(
                    started = generation,
                    current = state.generation,
                    "Discarding redesign for a replaced batch"
                );
                Err(SessionError::Superseded)
            } else {
                match result {
                    Ok(artifacts) => {
                        let count = artifacts.len();
                        let current = std::mem::take(&mut state.artifacts);
                        state.artifacts = merge_artifacts(&prior, current, artifacts);
                        Ok(count)
                    }
                    Err(e) => {
                        state.error = Some(e.to_string());
                        Err(SessionError::from(e))
                    }
                }
            }
        };

        self.notify(SessionEvent::RedesignFinished {
            ok: outcome.is_ok(),
        });
        outcome
    }

    /// Flip the keep flag of artifact `index`.
    ///
    /// Returns the new flag, or `None` when there is no artifact at `index`.
    pub async fn toggle_keep(&self, index: usize) -> Option<bool> {
        let kept = {
            let mut state = self.state.write().await;
            let kept = state
                .artifacts
                .get_mut(index)
                .and_then(|slot| slot.as_mut())
                .map(|artifact| artifact.toggle_kept());
            kept
        }?;

        debug!(index, kept, "Toggled keep");
        self.notify(SessionEvent::KeepToggled { index, kept });
        Some(kept)
    }

    /// Generate a video tour from every present artifact.
    ///
    /// Only one tour runs at a time. The credential gate is updated whatever the
    /// outcome; the video itself is discarded if the batch was replaced meanwhile.
    pub async fn generate_video_tour(&self) -> Result<VideoRef, SessionError> {
        let (references, mut gate, generation) = {
            let mut state = self.state.write().await;
            if state.video.is_running() {
                return Err(SessionError::VideoInProgress);
            }

            let references: Vec<ImagePayload> = state
                .artifacts
                .iter()
                .flatten()
                .map(|artifact| artifact.image.clone())
                .collect();
            if references.len() < MIN_TOUR_REFERENCES {
                return Err(SessionError::Video(VideoFailure::not_enough_inputs()));
            }

            let phase = if state.gate.is_satisfied() {
                VideoTourPhase::Submitting
            } else {
                VideoTourPhase::Gating
            };
            state.video = VideoJobState::Running { phase };
            self.phase_tx.send_replace(Some(phase));

            (references, state.gate, state.generation)
        };

        let result = self.video.run_video_tour(&references, &mut gate).await;

        let outcome = {
            let mut state = self.state.write().await;
            state.gate = gate;

            if state.generation != generation {
                info!(
                    started = generation,
                    current = state.generation,
                    "Discarding video tour for a replaced batch"
                );
                state.video = VideoJobState::Idle;
                Err(SessionError::Superseded)
            } else {
                match result {
                    Ok(video) => {
                        state.video = VideoJobState::Succeeded {
                            video: video.clone(),
                        };
                        Ok(video)
                    }
                    Err(failure) => {
                        state.video = VideoJobState::Failed {
                            failure: failure.clone(),
                        };
                        Err(SessionError::from(failure))
                    }
                }
            }
        };
        self.phase_tx.send_replace(None);

        let state_name = self.state.read().await.video.state_name();
        self.notify(SessionEvent::VideoFinished {
            state: state_name.to_string(),
        });
        outcome
    }

    /// Current state, with the live phase of a running video job.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;

        let video = match (&state.video, *self.phase_tx.borrow()) {
            (VideoJobState::Running { .. }, Some(phase)) => VideoJobState::Running { phase },
            (other, _) => other.clone(),
        };

        SessionSnapshot {
            user: state.user.clone(),
            style: state.style,
            sources: state
                .sources
                .iter()
                .map(|s| s.display_handle.clone())
                .collect(),
            artifacts: state.artifacts.clone(),
            redesigning: state.redesigning,
            error: state.error.clone(),
            video,
            key_selected: state.gate.is_satisfied(),
            generation: state.generation,
        }
    }
}

/// Apply a finished redesign run to the artifacts as they are now.
///
/// A slot that is kept now, or was carried forward kept, stays as it currently is.
/// Every other slot takes the fresh result.
fn merge_artifacts(
    prior: &[Option<Artifact>],
    current: Vec<Option<Artifact>>,
    fresh: Vec<Artifact>,
) -> Vec<Option<Artifact>> {
    let mut current = current.into_iter();
    fresh
        .into_iter()
        .enumerate()
        .map(|(i, fresh)| {
            let carried = prior.get(i).and_then(Option::as_ref).is_some_and(|a| a.kept);
            match current.next().flatten() {
                Some(now) if now.kept || carried => Some(now),
                _ => Some(fresh),
            }
        })
        .collect()
}

fn phase_forwarder(
    phase_tx: Arc<watch::Sender<Option<VideoTourPhase>>>,
    update_callback: Option<SessionUpdateCallback>,
) -> PhaseCallback {
    Arc::new(move |phase| {
        phase_tx.send_replace(Some(phase));
        if let Some(ref callback) = update_callback {
            callback(SessionEvent::VideoPhase { phase });
        }
    })
}
