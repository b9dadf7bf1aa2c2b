//! Configuration error types and handling

/// Error types for configuration loading and parameter validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO-related errors (file access, permissions, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration validation errors
    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// Path resolution errors
    #[error("Path resolution error: {0}")]
    PathResolution(String),

    /// Network name with no built-in defaults
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
