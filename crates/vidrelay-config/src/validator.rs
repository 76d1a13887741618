//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_google(config, &mut result);
        Self::validate_downloader(config, &mut result);
        Self::validate_browser(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_google(config: &Config, result: &mut ValidationResult) {
        let google = &config.google;

        for (path, value) in [
            ("google.sheets_base_url", &google.sheets_base_url),
            ("google.drive_base_url", &google.drive_base_url),
        ] {
            if url::Url::parse(value).is_err() {
                result.add_error(ValidationError::new(
                    path,
                    format!("Invalid URL: {}", value),
                ));
            }
        }

        if google.drive_folder_id.is_empty() {
            result.add_warning(ValidationWarning::new(
                "google.drive_folder_id",
                "No Drive folder configured, uploads land in the service account root",
            ));
        }

        if google.sheet_id.is_empty() {
            result.add_warning(ValidationWarning::new(
                "google.sheet_id",
                "No spreadsheet configured, sheet downloads will fail",
            ));
        }

        if google.sheet_name.is_empty() {
            result.add_error(ValidationError::new(
                "google.sheet_name",
                "Sheet name cannot be empty",
            ));
        }
    }

    fn validate_downloader(config: &Config, result: &mut ValidationResult) {
        let downloader = &config.downloader;

        if downloader.ytdlp_path.is_empty() {
            result.add_error(ValidationError::new(
                "downloader.ytdlp_path",
                "yt-dlp path cannot be empty",
            ));
        }

        if downloader.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "downloader.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if downloader.http_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "downloader.http_timeout_secs",
                "http_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;

        if browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if browser.navigation_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "browser.navigation_timeout_secs",
                "navigation_timeout_secs must be greater than 0",
            ));
        }

        if browser.scroll_steps == 0 {
            result.add_error(ValidationError::new(
                "browser.scroll_steps",
                "scroll_steps must be greater than 0 to trigger lazy-loaded videos",
            ));
        }

        if let Some(path) = &browser.chrome_path {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "browser.chrome_path",
                    format!("Chrome not found at {}", path.display()),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
