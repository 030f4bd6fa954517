//! PII redaction for log output.
//!
//! Emails keep their first character and domain; opaque tokens
//! (base64-ish or hex runs of 16+ chars, e.g. JWTs or password hashes)
//! are replaced wholesale.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap());

#[allow(clippy::unwrap_used)]
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9+/_\-.$=]{16,}").unwrap());

/// Redacts emails first, then tokens, so an email is never mistaken for a token.
pub fn redact(input: &str) -> String {
    let emails_masked = EMAIL.replace_all(input, |caps: &regex::Captures| {
        let full = &caps[0];
        match full.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                let first: String = local.chars().take(1).collect();
                format!("{first}***@{domain}")
            }
            _ => full.to_string(),
        }
    });

    TOKEN
        .replace_all(&emails_masked, |caps: &regex::Captures| {
            let candidate = &caps[0];
            // Masked emails and dotted identifiers like `users.email` stay readable.
            if candidate.contains("***") || !candidate.chars().any(|c| c.is_ascii_digit()) {
                candidate.to_string()
            } else {
                "[REDACTED_TOKEN]".to_string()
            }
        })
        .into_owned()
}

/// Wrapper that redacts its contents whenever it is formatted.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
