//! Job orchestration for redesign runs and video tours.
//!
//! - **Redesign**: fan-out of one transform per source image, joined positionally.
//!   Kept artifacts are carried forward without a service call.
//! - **Video tour**: gating, submission, polling and download of one long-running job.

mod classify;
mod config;
mod redesign;
mod types;
mod video_tour;

pub use classify::{is_credential_failure, is_transient};
pub use config::{PollPolicy, RedesignConfig, VideoTourConfig};
pub use redesign::RedesignOrchestrator;
pub use types::{
    CredentialGate, RedesignError, TransformFailure, VideoFailure, VideoFailureKind,
    VideoJobState, VideoRef, VideoTourPhase,
};
pub use video_tour::{PhaseCallback, VideoTourOrchestrator, TOUR_PROMPT};
