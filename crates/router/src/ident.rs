//! Identifier allow-list for device ids and categories

use crate::error::{Result, RouterError};

/// Longest accepted identifier, in characters
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Check an identifier: 1-64 ASCII alphanumerics, `_`, `-`, `.` or `:`
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_IDENTIFIER_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Validate every identifier in a list
///
/// `kind` names the field in the error ("device id", "category").
pub fn check_identifiers(kind: &str, values: &[String]) -> Result<()> {
    match values.iter().find(|v| !is_valid_identifier(v)) {
        Some(bad) => Err(RouterError::param(format!("invalid {}: {:?}", kind, bad))),
        None => Ok(()),
    }
}
