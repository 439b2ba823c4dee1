use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - API base is set and request timeout is non-zero
/// - Poll policy is well formed
/// - Reference image limit is within what the video service accepts
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.gemini.api_base.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "gemini.api_base cannot be empty".to_string(),
        ));
    }

    if config.gemini.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "gemini.timeout_secs cannot be 0".to_string(),
        ));
    }

    let video = &config.video;
    if video.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "video.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    if !video.backoff_multiplier.is_finite() || video.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(format!(
            "video.backoff_multiplier must be a finite number >= 1.0, got {}",
            video.backoff_multiplier
        )));
    }

    if video.max_poll_interval_ms < video.poll_interval_ms {
        return Err(ConfigError::ValidationError(
            "video.max_poll_interval_ms must be >= video.poll_interval_ms".to_string(),
        ));
    }

    if !(1..=3).contains(&video.max_reference_images) {
        return Err(ConfigError::ValidationError(format!(
            "video.max_reference_images must be between 1 and 3, got {}",
            video.max_reference_images
        )));
    }

    Ok(())
}
