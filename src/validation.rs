//! Input validation
//!
//! Checks that run before any request leaves the process. A value rejected
//! here never reaches the network.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{EntryPatch, NewEntry, NewLimit, NumberType};

/// Client-side validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Number or price left empty
    #[error("Please enter both a number and a price")]
    Missing,

    /// Number contains something other than digits
    #[error("Number must contain digits only: {0:?}")]
    NotDigits(String),

    /// Number has the wrong digit count for its type
    #[error("Number must have exactly {expected} digits, got {actual}")]
    DigitCount { expected: usize, actual: usize },

    /// Price text could not be read as an amount
    #[error("Price must be a whole amount using digits only: {0:?}")]
    InvalidPrice(String),

    /// Limit amount not strictly positive
    #[error("Limit amount must be greater than zero")]
    NonPositiveLimit,

    /// Draw date not in YYYY-MM-DD form
    #[error("Draw date must be YYYY-MM-DD: {0:?}")]
    InvalidDate(String),

    /// Update with nothing to change
    #[error("Nothing to update")]
    EmptyPatch,
}

/// Validate a number against the digit count of its type
pub fn validate_number(value: &str, number_type: NumberType) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing);
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotDigits(value.to_string()));
    }

    let expected = number_type.digits();
    let actual = value.chars().count();
    if actual != expected {
        return Err(ValidationError::DigitCount { expected, actual });
    }

    Ok(())
}

/// Parse price text typed by an operator.
///
/// Only ASCII digits are accepted; surrounding whitespace is ignored.
pub fn parse_price(text: &str) -> Result<f64, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Missing);
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPrice(text.to_string()));
    }

    text.parse::<u64>()
        .map(|v| v as f64)
        .map_err(|_| ValidationError::InvalidPrice(text.to_string()))
}

/// Validate a price amount already in numeric form
pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::InvalidPrice(price.to_string()));
    }
    Ok(())
}

/// Validate a limit amount
pub fn validate_limit_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NonPositiveLimit);
    }
    Ok(())
}

/// Parse a draw date in `YYYY-MM-DD` form
pub fn parse_draw_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

/// Validate a create-entry payload
pub fn validate_new_entry(entry: &NewEntry) -> Result<(), ValidationError> {
    validate_number(&entry.number_value, entry.number_type)?;
    validate_price(entry.price)
}

/// Validate a partial update.
///
/// A new number is checked against the new type when the patch changes both,
/// otherwise against `current_type`.
pub fn validate_patch(patch: &EntryPatch, current_type: NumberType) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }
    if let Some(value) = &patch.number_value {
        validate_number(value, patch.number_type.unwrap_or(current_type))?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    Ok(())
}

/// Validate a create-limit payload
pub fn validate_new_limit(limit: &NewLimit) -> Result<(), ValidationError> {
    validate_limit_amount(limit.limit_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_number_two_digits() {
        assert!(validate_number("07", NumberType::TwoDigit).is_ok());
        assert_eq!(
            validate_number("7", NumberType::TwoDigit),
            Err(ValidationError::DigitCount { expected: 2, actual: 1 })
        );
        assert_eq!(
            validate_number("123", NumberType::TwoDigit),
            Err(ValidationError::DigitCount { expected: 2, actual: 3 })
        );
        assert!(validate_number("123", NumberType::ThreeDigit).is_ok());
    }

    #[test]
    fn test_validate_number_rejects_non_digits() {
        assert!(matches!(
            validate_number("4a", NumberType::TwoDigit),
            Err(ValidationError::NotDigits(_))
        ));
        assert!(matches!(
            validate_number("١٢", NumberType::TwoDigit),
            Err(ValidationError::NotDigits(_))
        ));
        assert_eq!(validate_number("", NumberType::TwoDigit), Err(ValidationError::Missing));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("150"), Ok(150.0));
        assert_eq!(parse_price(" 0 "), Ok(0.0));
        assert_eq!(parse_price(""), Err(ValidationError::Missing));
        assert!(parse_price("12.5").is_err());
        assert!(parse_price("-5").is_err());
        assert!(parse_price("1,000").is_err());
    }

    #[test]
    fn test_validate_limit_amount() {
        assert!(validate_limit_amount(500.0).is_ok());
        assert_eq!(validate_limit_amount(0.0), Err(ValidationError::NonPositiveLimit));
        assert_eq!(validate_limit_amount(f64::NAN), Err(ValidationError::NonPositiveLimit));
    }

    #[test]
    fn test_parse_draw_date() {
        assert_eq!(
            parse_draw_date("2025-03-16").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()
        );
        assert!(parse_draw_date("16/03/2025").is_err());
    }

    #[test]
    fn test_validate_patch() {
        assert_eq!(
            validate_patch(&EntryPatch::default(), NumberType::TwoDigit),
            Err(ValidationError::EmptyPatch)
        );
        let patch = EntryPatch::default().number_value("123");
        assert!(validate_patch(&patch, NumberType::TwoDigit).is_err());
        let patch = patch.number_type(NumberType::ThreeDigit);
        assert!(validate_patch(&patch, NumberType::TwoDigit).is_ok());
        let patch = EntryPatch::default().price(-1.0);
        assert!(validate_patch(&patch, NumberType::TwoDigit).is_err());
    }

    #[test]
    fn test_validate_new_entry() {
        assert!(validate_new_entry(&NewEntry::new(1, "42", 100.0)).is_ok());
        assert!(validate_new_entry(&NewEntry::new(1, "4", 100.0)).is_err());
        assert!(validate_new_entry(&NewEntry::new(1, "42", f64::INFINITY)).is_err());
    }
}
