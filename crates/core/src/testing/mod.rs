//! Testing utilities and mock implementations.
//!
//! Mocks for every external service trait, so redesign runs, video tours and whole
//! sessions can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use roomshift_core::testing::{MockImageTransformer, MockKeySelector, MockVideoSynthesizer};
//!
//! let transformer = MockImageTransformer::new();
//! let synthesizer = MockVideoSynthesizer::new();
//! let selector = MockKeySelector::new();
//!
//! // Job stays pending for two checks, then finishes.
//! synthesizer.complete_after(2, "mock://videos/1").await;
//! ```

mod mock_key_selector;
mod mock_transformer;
mod mock_video;

pub use mock_key_selector::MockKeySelector;
pub use mock_transformer::{MockImageTransformer, REDESIGN_MARKER};
pub use mock_video::{MockVideoSynthesizer, MOCK_VIDEO_BYTES};

/// Test fixtures and helper functions.
pub mod fixtures {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    use crate::media::{Artifact, ImagePayload, SourceImage};

    /// A small PNG payload whose bytes are unique to `tag`.
    pub fn payload(tag: u8) -> ImagePayload {
        ImagePayload::new(vec![0x89, b'P', b'N', b'G', tag], "image/png")
    }

    /// `count` payloads with distinct bytes.
    pub fn payloads(count: usize) -> Vec<ImagePayload> {
        (0..count).map(|i| payload(i as u8)).collect()
    }

    /// `count` uploaded sources named `room-1.png`, `room-2.png`, ...
    pub fn sources(count: usize) -> Vec<SourceImage> {
        (0..count)
            .map(|i| SourceImage::new(payload(i as u8), &format!("room-{}.png", i + 1)))
            .collect()
    }

    /// An artifact holding `bytes`, pinned or not.
    pub fn artifact(bytes: &[u8], kept: bool) -> Artifact {
        let mut artifact = Artifact::fresh(ImagePayload::new(bytes.to_vec(), "image/png"));
        artifact.kept = kept;
        artifact
    }

    /// An unsigned identity token carrying the given claims.
    pub fn identity_token(name: &str, email: &str, picture: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let claims = serde_json::json!({
            "name": name,
            "email": email,
            "picture": picture,
            "sub": "1234567890",
        });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, payload)
    }
}
