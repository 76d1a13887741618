//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `${VAR}` reference whose variable is unset.
    #[error("Config references ${{{0}}} but it is not set")]
    MissingEnv(String),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_path() {
        let err = ConfigError::NotFound(PathBuf::from("config/default.toml"));
        assert_eq!(err.to_string(), "Config file not found: config/default.toml");
    }

    #[test]
    fn test_missing_env_shows_reference() {
        let err = ConfigError::MissingEnv("IG_COOKIES".to_string());
        assert_eq!(err.to_string(), "Config references ${IG_COOKIES} but it is not set");
    }

    #[test]
    fn test_read_keeps_source() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/vidrelay.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/etc/vidrelay.toml"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
