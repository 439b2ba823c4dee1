//! Failure classification for video jobs.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::video::VideoServiceError;

/// Messages the video service returns when the key cannot reach the model.
static CREDENTIAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)requested entity was not found|permission denied|unauthori[sz]ed|api key not valid",
    )
    .expect("credential pattern is valid")
});

/// Whether a submission or poll failure means the selected key lacks access.
pub fn is_credential_failure(error: &VideoServiceError) -> bool {
    match error {
        VideoServiceError::NotConfigured => true,
        VideoServiceError::Api {
            status: 401 | 403 | 404,
            ..
        } => true,
        VideoServiceError::Operation {
            code: Some(401 | 403 | 404),
            ..
        } => true,
        VideoServiceError::Api { message, .. } | VideoServiceError::Operation { message, .. } => {
            CREDENTIAL_PATTERN.is_match(message)
        }
        VideoServiceError::Http(message) => CREDENTIAL_PATTERN.is_match(message),
        VideoServiceError::Json(_) | VideoServiceError::Download { .. } => false,
    }
}

/// Whether a poll failure is worth another attempt.
///
/// Transport errors, rate limiting and server errors qualify unless they look like a
/// credential problem.
pub fn is_transient(error: &VideoServiceError) -> bool {
    if is_credential_failure(error) {
        return false;
    }
    match error {
        VideoServiceError::Http(_) => true,
        VideoServiceError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> VideoServiceError {
        VideoServiceError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_authorization_statuses_are_credential_failures() {
        assert!(is_credential_failure(&api(401, "")));
        assert!(is_credential_failure(&api(403, "")));
        assert!(is_credential_failure(&api(404, "")));
    }

    #[test]
    fn test_entity_not_found_message_is_credential_failure() {
        assert!(is_credential_failure(&api(
            400,
            "Requested entity was not found."
        )));
        assert!(is_credential_failure(&VideoServiceError::Operation {
            code: None,
            message: "PERMISSION DENIED for model".to_string(),
        }));
        assert!(is_credential_failure(&api(400, "API key not valid. Please pass a valid API key.")));
    }

    #[test]
    fn test_other_failures_are_generic() {
        assert!(!is_credential_failure(&api(500, "internal error")));
        assert!(!is_credential_failure(&api(429, "quota exceeded")));
        assert!(!is_credential_failure(&VideoServiceError::Json("eof".to_string())));
        assert!(!is_credential_failure(&VideoServiceError::Download {
            status: 404,
            message: "gone".to_string(),
        }));
    }

    #[test]
    fn test_missing_key_is_credential_failure() {
        assert!(is_credential_failure(&VideoServiceError::NotConfigured));
    }

    #[test]
    fn test_transient_failures() {
        assert!(is_transient(&VideoServiceError::Http("connection reset".to_string())));
        assert!(is_transient(&api(503, "unavailable")));
        assert!(is_transient(&api(429, "quota exceeded")));
        assert!(!is_transient(&api(400, "bad request")));
        assert!(!is_transient(&api(403, "forbidden")));
        assert!(!is_transient(&VideoServiceError::Operation {
            code: Some(500),
            message: "internal".to_string(),
        }));
    }
}
