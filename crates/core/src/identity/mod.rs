//! Signed-in user identity and its persisted token.

mod store;
mod types;

pub use store::*;
pub use types::*;
