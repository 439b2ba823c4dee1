//! Trait definitions for the transform module.

use async_trait::async_trait;
use thiserror::Error;

use crate::media::{ImagePayload, SourceImage};
use crate::style::DesignStyle;

use super::prompt::redesign_instruction;

/// Errors that can occur while transforming an image.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    /// The service answered but the response carried no image part.
    #[error("No image was generated in the API response")]
    NoImage,

    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Image transform API key not configured")]
    NotConfigured,
}

/// A single transform request.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub image: ImagePayload,
    pub instruction: String,
}

impl TransformRequest {
    /// Request a redesign of `source` in `style`.
    pub fn redesign(source: &SourceImage, style: DesignStyle) -> Self {
        Self {
            image: source.payload.clone(),
            instruction: redesign_instruction(style),
        }
    }
}

/// External service that restyles an image according to a text instruction.
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Name of this implementation for logging.
    fn name(&self) -> &str;

    /// Transform one image. Returns the produced image or a failure.
    async fn transform(&self, request: TransformRequest) -> Result<ImagePayload, TransformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            TransformError::NoImage.to_string(),
            "No image was generated in the API response"
        );
        let err = TransformError::Api {
            status: 500,
            message: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - internal");
    }

    #[test]
    fn test_redesign_request_carries_source_payload() {
        let source = SourceImage::new(ImagePayload::new(vec![1, 2], "image/jpeg"), "bath.jpg");
        let request = TransformRequest::redesign(&source, DesignStyle::Coastal);
        assert_eq!(request.image.mime_type, "image/jpeg");
        assert_eq!(request.image.bytes, vec![1, 2]);
        assert!(request.instruction.contains("Coastal"));
    }
}
