//! Media value types.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::encoding::mime_for_path;

/// Errors raised while loading or decoding media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image type: {0}")]
    UnsupportedType(PathBuf),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Raw image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Decode a standard base64 payload, as returned inline by the transform service.
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> Result<Self, MediaError> {
        let bytes = general_purpose::STANDARD
            .decode(data)
            .map_err(|e| MediaError::InvalidBase64(e.to_string()))?;
        Ok(Self::new(bytes, mime_type))
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// An uploaded room photo. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub payload: ImagePayload,
    /// File name plus a unique suffix, used for display and logging.
    pub display_handle: String,
}

impl SourceImage {
    pub fn new(payload: ImagePayload, name: &str) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            payload,
            display_handle: format!("{}#{}", name, &id[..8]),
        }
    }

    /// Read an image from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, MediaError> {
        let mime_type =
            mime_for_path(path).ok_or_else(|| MediaError::UnsupportedType(path.to_path_buf()))?;
        let bytes = tokio::fs::read(path).await.map_err(|source| MediaError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");

        Ok(Self::new(ImagePayload::new(bytes, mime_type), name))
    }

    pub fn mime_type(&self) -> &str {
        &self.payload.mime_type
    }
}

/// A redesign result for one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub image: ImagePayload,
    /// Pinned artifacts are carried forward unchanged by later redesign runs.
    pub kept: bool,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// A freshly generated, unpinned artifact.
    pub fn fresh(image: ImagePayload) -> Self {
        Self {
            image,
            kept: false,
            created_at: Utc::now(),
        }
    }

    /// Flip the pin. Never touches the image bytes.
    pub fn toggle_kept(&mut self) -> bool {
        self.kept = !self.kept;
        self.kept
    }
}
