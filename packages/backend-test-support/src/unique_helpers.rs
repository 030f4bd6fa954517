//! Test helpers for generating unique test data
//!
//! ULID-based values keep tests isolated when they share a database.

use ulid::Ulid;

/// Generate a unique string in the format `{prefix}-{ulid}`.
///
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("event");
/// let id2 = unique_str("event");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("event-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique, already-normalized (lower-case) email address
/// in the format `{prefix}-{ulid}@example.test`.
///
/// ```
/// use backend_test_support::unique_helpers::unique_email;
///
/// let email = unique_email("buyer");
/// assert!(email.ends_with("@example.test"));
/// assert_eq!(email, email.to_lowercase());
/// ```
pub fn unique_email(prefix: &str) -> String {
    format!(
        "{}-{}@example.test",
        prefix.to_lowercase(),
        Ulid::new().to_string().to_lowercase()
    )
}
