//! Format checks for string-backed types (email, URL, UUID, date/time).

use once_cell::sync::Lazy;
use regex::Regex;

// Patterns are literals; a failed compile leaves the check rejecting everything.
static EMAIL_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

static URL_REGEX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").ok());

static UUID_REGEX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-8][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$").ok()
});

static DATETIME_REGEX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?(Z|[+-]\d{2}:\d{2})$").ok()
});

static DATE_REGEX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

static TIME_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d):([0-5]\d)(\.\d{1,9})?$").ok());

fn matches(regex: &Lazy<Option<Regex>>, value: &str) -> bool {
    Lazy::force(regex).as_ref().is_some_and(|re| re.is_match(value))
}

/// ```
/// use modern_rest_validation::formats::is_email;
///
/// assert!(is_email("user@example.com"));
/// assert!(!is_email("invalid-email"));
/// ```
pub fn is_email(value: &str) -> bool {
    matches(&EMAIL_REGEX, value)
}

/// http/https URLs only
pub fn is_url(value: &str) -> bool {
    matches(&URL_REGEX, value)
}

/// Hyphenated RFC 4122 UUID, versions 1 through 8
pub fn is_uuid(value: &str) -> bool {
    matches(&UUID_REGEX, value)
}

/// ISO 8601 datetime with a mandatory offset
pub fn is_datetime(value: &str) -> bool {
    matches(&DATETIME_REGEX, value)
}

pub fn is_date(value: &str) -> bool {
    matches(&DATE_REGEX, value)
}

pub fn is_time(value: &str) -> bool {
    matches(&TIME_REGEX, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_email("test.user+tag@subdomain.example.co.uk"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@example"));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_url("http://localhost:8080"));
        assert!(is_url("https://sub.domain.example.com/path?query=value"));
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn test_uuid_validation() {
        assert!(is_uuid("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_uuid("6ba7b810-9dad-11d1-80b4-00c04fd430c8"));
        assert!(!is_uuid("550e8400e29b41d4a716446655440000"));
    }

    #[test]
    fn test_datetime_and_time() {
        assert!(is_datetime("2024-01-19T12:00:00.123Z"));
        assert!(!is_datetime("2024-01-19 12:00:00"));
        assert!(is_date("2000-12-31"));
        assert!(!is_date("01/19/2024"));
        assert!(is_time("23:59:59.999"));
        assert!(!is_time("25:00:00"));
    }
}
