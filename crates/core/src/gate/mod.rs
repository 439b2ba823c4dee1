//! Credential gate for video generation.
//!
//! Video jobs need an API key that has access to the video model. Before the first
//! submission the environment must complete a key-selection step, exposed through
//! [`KeySelector`].

mod configured;
mod traits;

pub use configured::{ApiKeyHandle, ConfiguredKeySelector};
pub use traits::{GateError, KeySelector};
