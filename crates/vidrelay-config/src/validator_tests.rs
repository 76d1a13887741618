use super::*;

fn configured() -> Config {
    let mut config = Config::default();
    config.google.drive_folder_id = "folder".to_string();
    config.google.sheet_id = "sheet".to_string();
    config
}

#[test]
fn test_validate_default_config_is_valid_with_warnings() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "google.sheet_id"));
    assert!(result.warnings.iter().any(|w| w.path == "google.drive_folder_id"));
}

#[test]
fn test_validate_configured_has_no_warnings() {
    let result = ConfigValidator::validate(&configured());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_port() {
    let mut config = configured();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_empty_host() {
    let mut config = configured();
    config.server.host = String::new();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "server.host"));
}

#[test]
fn test_validate_invalid_base_url() {
    let mut config = configured();
    config.google.drive_base_url = "not a url".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "google.drive_base_url"));
}

#[test]
fn test_validate_zero_timeouts() {
    let mut config = configured();
    config.downloader.timeout_secs = 0;
    config.downloader.http_timeout_secs = 0;
    config.browser.navigation_timeout_secs = 0;

    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 3);
}

#[test]
fn test_validate_empty_ytdlp_path() {
    let mut config = configured();
    config.downloader.ytdlp_path = String::new();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "downloader.ytdlp_path"));
}

#[test]
fn test_validate_zero_scroll_steps() {
    let mut config = configured();
    config.browser.scroll_steps = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "browser.scroll_steps"));
}

#[test]
fn test_validate_missing_chrome_path_warns() {
    let mut config = configured();
    config.browser.chrome_path = Some("/nonexistent/chrome".into());

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "browser.chrome_path"));
}
