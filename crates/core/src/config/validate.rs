use super::{types::Config, ConfigError};

/// Log levels ffmpeg understands for `-loglevel`.
pub const ENGINE_LOG_LEVELS: &[&str] = &[
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Validate configuration
/// Currently validates:
/// - engine.ffmpeg_path is not empty
/// - engine.log_level is a level ffmpeg accepts
/// - output.dir is not empty
/// - orchestrator.event_buffer is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.engine.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if !ENGINE_LOG_LEVELS.contains(&config.engine.log_level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "engine.log_level must be one of {}, got '{}'",
            ENGINE_LOG_LEVELS.join(", "),
            config.engine.log_level
        )));
    }

    if config.output.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "output.dir cannot be empty".to_string(),
        ));
    }

    if config.orchestrator.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.event_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}
