//! Field validators for grant form input.
//!
//! Each validator is a pure function from raw field text to a [`FieldCheck`]:
//! whether the value may be submitted, plus the normalized text to write back
//! into the field. Normalization is tolerant: invalid input is still
//! normalized for redisplay, only `valid` gates submission. Applying the
//! normalized value to the originating field is the caller's job.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::{PORT_MAX, PORT_MIN};

/// Result of validating one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    /// Whether the raw value may be submitted
    pub valid: bool,
    /// Cleaned-up value for redisplay in the field
    pub normalized: String,
}

impl FieldCheck {
    fn new(valid: bool, normalized: String) -> Self {
        Self { valid, normalized }
    }
}

fn user_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+$").unwrap())
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w!@#$%^&*()]+$").unwrap())
}

fn domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9]+(-[A-Za-z0-9]+)*\.)+[A-Za-z]{2,}$").unwrap())
}

fn subdomain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,19}$").unwrap())
}

fn expire_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap())
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Username: non-empty, word characters only.
pub fn user(raw: &str) -> FieldCheck {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty() && user_re().is_match(raw);
    FieldCheck::new(valid, trimmed.to_string())
}

/// Token: non-empty, word characters plus `!@#$%^&*()`.
pub fn token(raw: &str) -> FieldCheck {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty() && token_re().is_match(raw);
    FieldCheck::new(valid, trimmed.to_string())
}

/// Comment: free text without newline/tab/carriage-return. Empty is valid.
pub fn comment(raw: &str) -> FieldCheck {
    let trimmed = raw.trim();
    let valid = trimmed.is_empty() || !raw.contains(['\n', '\t', '\r']);
    let normalized: String = trimmed
        .chars()
        .filter(|&c| !matches!(c, '\n' | '\t' | '\r'))
        .collect();
    FieldCheck::new(valid, normalized)
}

/// Port list: comma-separated single ports or `start-end` ranges, each bound
/// in [1,65535] and `start <= end`. Empty means no restriction and is valid.
/// The first bad element invalidates the whole field.
pub fn ports(raw: &str) -> FieldCheck {
    let normalized = strip_whitespace(raw);
    if raw.trim().is_empty() {
        return FieldCheck::new(true, normalized);
    }
    let valid = raw.split(',').all(port_element_ok);
    FieldCheck::new(valid, normalized)
}

fn port_element_ok(element: &str) -> bool {
    let mut bounds = element.split('-');
    match (bounds.next(), bounds.next(), bounds.next()) {
        (Some(single), None, _) => parse_port(single).is_some(),
        (Some(start), Some(end), None) => match (parse_port(start), parse_port(end)) {
            (Some(start), Some(end)) => start <= end,
            _ => false,
        },
        _ => false,
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    let digits = raw.trim();
    if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let port: u32 = digits.parse().ok()?;
    (u32::from(PORT_MIN)..=u32::from(PORT_MAX))
        .contains(&port)
        .then_some(port as u16)
}

/// Domain list: comma-separated FQDNs. Empty is valid.
pub fn domains(raw: &str) -> FieldCheck {
    let normalized = strip_whitespace(raw);
    if raw.trim().is_empty() {
        return FieldCheck::new(true, normalized);
    }
    let valid = raw.split(',').all(|d| domain_re().is_match(d.trim()));
    FieldCheck::new(valid, normalized)
}

/// Subdomain list: comma-separated labels, 1-20 alphanumeric-or-hyphen chars
/// not starting with a hyphen. Empty is valid.
pub fn subdomains(raw: &str) -> FieldCheck {
    let normalized = strip_whitespace(raw);
    if raw.trim().is_empty() {
        return FieldCheck::new(true, normalized);
    }
    let valid = raw.split(',').all(|s| subdomain_re().is_match(s.trim()));
    FieldCheck::new(valid, normalized)
}

/// Expiry timestamp: `YYYY-MM-DD HH:MM:SS`, or empty for "never expires".
pub fn expire_date(raw: &str) -> FieldCheck {
    let trimmed = raw.trim();
    let valid = trimmed.is_empty() || expire_date_re().is_match(trimmed);
    FieldCheck::new(valid, trimmed.to_string())
}

/// Server: any non-empty value. Membership in the known-server set is
/// enforced by whoever populates the choices, not re-checked here.
pub fn server(raw: &str) -> FieldCheck {
    let trimmed = raw.trim();
    FieldCheck::new(!trimmed.is_empty(), trimmed.to_string())
}
