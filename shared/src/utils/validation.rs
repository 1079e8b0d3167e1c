//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Check if an email address is plausibly valid
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Normalize an email address for use as a partition key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Keep only ASCII digits, capped at `max_len` characters
pub fn digits_only(value: &str, max_len: usize) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).take(max_len).collect()
}

/// Mask an email address for logs (e.g., j***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}
