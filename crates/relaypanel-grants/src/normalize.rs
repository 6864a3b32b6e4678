//! Transforms between the comma-joined form text and the structured wire
//! representation of a grant's list fields.

use crate::grant::{Grant, GrantUpdate, PortValue};

/// Split form ports text into wire values: all-digit elements become numbers,
/// everything else (ranges included) stays a string verbatim. An
/// auto-allocated range is a single element here, never re-split into its
/// bounds. Empty text means no restriction.
pub fn split_ports(text: &str) -> Vec<PortValue> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|element| {
            if !element.is_empty() && element.bytes().all(|b| b.is_ascii_digit()) {
                match element.parse() {
                    Ok(n) => PortValue::Num(n),
                    Err(_) => PortValue::Text(element.to_string()),
                }
            } else {
                PortValue::Text(element.to_string())
            }
        })
        .collect()
}

/// Join wire port values back into form text.
pub fn join_ports(values: &[PortValue]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a comma-joined domains/subdomains field. Empty text means empty set.
pub fn split_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::to_string).collect()
}

/// Join a domains/subdomains sequence back into form text.
pub fn join_list(items: &[String]) -> String {
    items.join(",")
}

/// Coerce numeric-looking string elements to numbers so both update snapshots
/// use one representation regardless of whether they came from a table edit
/// or a reload.
pub fn coerce_ports(values: &mut [PortValue]) {
    for value in values.iter_mut() {
        if value.is_numeric_text() {
            if let PortValue::Text(s) = value {
                if let Ok(n) = s.parse() {
                    *value = PortValue::Num(n);
                }
            }
        }
    }
}

/// Build the update payload, coercing port representation in both snapshots.
pub fn prepare_update(mut before: Grant, mut after: Grant) -> GrantUpdate {
    coerce_ports(&mut before.ports);
    coerce_ports(&mut after.ports);
    GrantUpdate { before, after }
}
