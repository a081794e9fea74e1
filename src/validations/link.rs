use url::Url;
use validator::ValidationError;

pub const SHORT_CODE_MIN: usize = 3;
pub const SHORT_CODE_MAX: usize = 25;

/// `^[A-Za-z0-9]{3,25}$` without pulling in a regex engine
pub fn is_valid_short_code(code: &str) -> bool {
    (SHORT_CODE_MIN..=SHORT_CODE_MAX).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn validate_short_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_short_code(code) {
        return Ok(());
    }

    let mut err = ValidationError::new("short_code");
    err.message = Some("Invalid short code".into());
    Err(err)
}

/// Parses an absolute http/https URL with a host into its serialized form.
/// Surrounding whitespace and embedded tabs or newlines do not survive.
pub fn normalize_url(url_str: &str) -> Option<String> {
    Url::parse(url_str.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .map(String::from)
}

/// Validates that a URL string is absolute and uses http/https
pub fn validate_url(url_str: &str) -> Result<(), ValidationError> {
    if normalize_url(url_str).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("destination_url");
        err.message = Some("Invalid URL".into());
        Err(err)
    }
}
