//! Interactive session state.
//!
//! Owns everything one user works with: identity, uploaded sources, artifacts, the
//! selected style, the credential gate and the video job. Enforces single flight for
//! redesign runs and video tours, and discards results computed for a superseded
//! upload.

mod controller;
mod types;

pub use controller::SessionController;
pub use types::{SessionError, SessionEvent, SessionSnapshot, SessionUpdateCallback};
