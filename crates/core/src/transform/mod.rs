//! Image transform service.
//!
//! The [`ImageTransformer`] trait is the boundary to the external service that turns a
//! room photo plus a style instruction into a redesigned image.
//! [`GeminiImageClient`] is the production implementation.

mod gemini;
mod prompt;
mod traits;

pub use gemini::GeminiImageClient;
pub use prompt::redesign_instruction;
pub use traits::{ImageTransformer, TransformError, TransformRequest};
