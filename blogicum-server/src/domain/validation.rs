//! Field normalizers shared by the domain constructors.
//!
//! Each helper trims its input and returns the owned, normalized value or a
//! [`DomainError::Validation`] naming the offending field.

use super::error::DomainError;

pub(crate) fn positive_id(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

pub(crate) fn optional_positive_id(
    field: &'static str,
    value: Option<i64>,
) -> Result<(), DomainError> {
    match value {
        Some(value) => positive_id(field, value),
        None => Ok(()),
    }
}

/// Trims `value` and requires `1..=max_chars` characters.
pub(crate) fn bounded_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
    message: &'static str,
) -> Result<String, DomainError> {
    let value = value.trim();
    let len = value.chars().count();
    if len == 0 || len > max_chars {
        return Err(DomainError::Validation { field, message });
    }
    Ok(value.to_string())
}

/// Trims `value` and requires it to be non-empty.
pub(crate) fn non_empty_text(field: &'static str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(value.to_string())
}
