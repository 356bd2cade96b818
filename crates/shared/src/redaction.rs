//! Secret detection and redaction utilities.
//!
//! Used by log adapters so field values and URLs never carry credentials.

use url::Url;

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key name likely refers to a secret.
///
/// # Examples
///
/// ```
/// use activity_finder_shared::is_secret_key;
///
/// assert!(is_secret_key("API_KEY"));
/// assert!(is_secret_key("password"));
/// assert!(!is_secret_key("resultsUrl"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Strip userinfo from a URL so it can be logged.
///
/// Unparseable input is replaced by a placeholder rather than echoed back.
pub fn redact_url_credentials(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            let has_credentials = parsed.password().is_some() || !parsed.username().is_empty();
            if has_credentials
                && (parsed.set_username("").is_err() || parsed.set_password(None).is_err())
            {
                return "[invalid url]".to_string();
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}
