use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Malformed identity token: {0}")]
    MalformedToken(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Profile claims of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

/// Decode the profile claims of a JWT.
///
/// Only the payload segment is read. The signature is not verified; the token comes
/// straight from the identity provider and is only used for display.
pub fn decode_token(token: &str) -> Result<UserIdentity, IdentityError> {
    let mut segments = token.trim().split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
        _ => {
            return Err(IdentityError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    // Some providers pad the payload anyway.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::MalformedToken(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| IdentityError::MalformedToken(e.to_string()))
}
