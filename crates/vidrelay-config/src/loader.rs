//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env reference pattern"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_config_paths(&mut config);
        Ok(config)
    }

    /// Expand `~` in every path setting.
    fn expand_config_paths(config: &mut Config) {
        let paths = [
            &mut config.google.credentials_path,
            &mut config.downloader.work_dir,
            &mut config.downloader.cookies_secret_path,
            &mut config.logging.dir,
        ];
        for path in paths.into_iter().chain(config.browser.chrome_path.as_mut()) {
            if let Some(raw) = path.to_str() {
                *path = PathBuf::from(Self::expand_path(raw));
            }
        }
    }

    /// Load configuration from a file, falling back to defaults when the file
    /// does not exist. Parse errors are still reported.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Full-line `#` comments are copied untouched.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            if line.trim_start().starts_with('#') {
                result.push_str(line);
                continue;
            }

            let mut expanded = line.to_string();
            for cap in ENV_REF.captures_iter(line) {
                let name = &cap[1];
                let value =
                    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_string()))?;
                expanded = expanded.replace(&cap[0], &value);
            }
            result.push_str(&expanded);
        }
        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/videos`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
