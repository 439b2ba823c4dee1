//! Image payloads, uploaded sources and redesign artifacts.

mod encoding;
mod types;

pub use encoding::{artifact_file_name, extension_for_mime, mime_for_path, video_file_name};
pub use types::{Artifact, ImagePayload, MediaError, SourceImage};
