use secrecy::{ExposeSecret, SecretString};

pub const REDACTED: &str = "[REDACTED]";

/// Format a secret value, respecting the show_secrets flag.
pub fn format_secret(secret: &SecretString, show_secrets: bool) -> String {
    if show_secrets {
        secret.expose_secret().to_string()
    } else {
        REDACTED.to_string()
    }
}

/// Scrub every occurrence of `secret` from free text such as driver error
/// messages that echo the connection string.
pub fn redact(text: &str, secret: &SecretString, show_secrets: bool) -> String {
    let raw = secret.expose_secret();
    if show_secrets || raw.is_empty() {
        return text.to_string();
    }
    text.replace(raw, REDACTED)
}
