//! Upload file names.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Clean a name so it is valid on Windows and Linux and ends in `.mp4`.
///
/// Blank names become a random UUID.
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim();
    let base = if trimmed.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        trimmed.to_string()
    };

    let cleaned = INVALID_CHARS.replace_all(&base, "_");
    let mut cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();

    if !cleaned.to_lowercase().ends_with(".mp4") {
        cleaned.push_str(".mp4");
    }
    cleaned
}
