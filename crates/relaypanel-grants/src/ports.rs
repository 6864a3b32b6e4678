//! Structured port specifiers and the per-server high-water-mark scan.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::grant::{Grant, PortValue};
use crate::{PORT_MAX, PORT_MIN};

/// A parsed port rule: one port or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range(u16, u16),
}

impl PortSpec {
    /// Highest port this specifier covers.
    pub fn upper(&self) -> u16 {
        match *self {
            PortSpec::Single(p) => p,
            PortSpec::Range(_, end) => end,
        }
    }
}

/// Error parsing a port specifier string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortSpecError {
    #[error("port specifier is empty")]
    Empty,
    #[error("'{0}' is not a port number")]
    NotANumber(String),
    #[error("port {0} is out of range")]
    OutOfRange(u32),
    #[error("range start {0} is greater than end {1}")]
    Inverted(u16, u16),
    #[error("'{0}' has too many range bounds")]
    TooManyBounds(String),
}

impl FromStr for PortSpec {
    type Err = PortSpecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PortSpecError::Empty);
        }
        let mut bounds = raw.split('-');
        match (bounds.next(), bounds.next(), bounds.next()) {
            (Some(single), None, _) => Ok(PortSpec::Single(parse_bound(single)?)),
            (Some(start), Some(end), None) => {
                let start = parse_bound(start)?;
                let end = parse_bound(end)?;
                if start > end {
                    return Err(PortSpecError::Inverted(start, end));
                }
                Ok(PortSpec::Range(start, end))
            }
            _ => Err(PortSpecError::TooManyBounds(raw.to_string())),
        }
    }
}

fn parse_bound(raw: &str) -> Result<u16, PortSpecError> {
    let digits = raw.trim();
    let value: u32 = digits
        .parse()
        .map_err(|_| PortSpecError::NotANumber(digits.to_string()))?;
    if !(u32::from(PORT_MIN)..=u32::from(PORT_MAX)).contains(&value) {
        return Err(PortSpecError::OutOfRange(value));
    }
    Ok(value as u16)
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PortSpec::Single(p) => write!(f, "{}", p),
            PortSpec::Range(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

/// Highest port mentioned by a grant's port values, or 0 if none.
///
/// Numbers count as-is, string specifiers contribute their upper bound,
/// anything unparsable is skipped.
pub fn max_port_in(values: &[PortValue]) -> u16 {
    values
        .iter()
        .filter_map(|value| match value {
            PortValue::Num(n) => u16::try_from(*n).ok(),
            PortValue::Text(s) => s.parse::<PortSpec>().ok().map(|spec| spec.upper()),
        })
        .max()
        .unwrap_or(0)
}

/// Per-server high-water mark over all grants. Servers appear in the map as
/// soon as they own at least one grant, even if that grant lists no ports.
pub fn max_ports_by_server<'a, I>(grants: I) -> HashMap<String, u16>
where
    I: IntoIterator<Item = &'a Grant>,
{
    let mut map: HashMap<String, u16> = HashMap::new();
    for grant in grants {
        let entry = map.entry(grant.server.clone()).or_insert(0);
        *entry = (*entry).max(max_port_in(&grant.ports));
    }
    map
}
