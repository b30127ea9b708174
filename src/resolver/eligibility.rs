// src/resolver/eligibility.rs
// =============================================================================
// Decides whether a record's link field is worth a network request.
//
// The markers below are the contract with whoever produces the input files.
// Anything else (plain usernames, numbers, already-resolved IDs, nulls) is
// passed through untouched.
// =============================================================================

use serde_json::Value;

/// Substrings that mark a value as a profile link
pub const LINK_MARKERS: [&str; 2] = ["facebook.com", "/share/"];

// Returns the link if the value is a string containing one of the markers
pub fn eligible_link(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if LINK_MARKERS.iter().any(|m| s.contains(m)) => Some(s),
        _ => None,
    }
}
