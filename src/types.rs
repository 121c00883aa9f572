//! Core data types for NumberX
//!
//! This module defines the records exchanged with the NumberX REST service:
//! - `Round`: A dated lottery draw that owns entries and limits
//! - `Entry`: One recorded bet (number, price, over-limit flag)
//! - `PriceLimit`: Maximum aggregate wager per number type and round
//! - `NumberSummary` and `RoundSummary`: Server-side aggregates for reports
//! - `NumberType`: Classification of numbers by digit count

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned by the service
pub type RoundId = i64;
/// Identifier assigned by the service
pub type EntryId = i64;
/// Identifier assigned by the service
pub type LimitId = i64;

/// Kind of number a bet is placed on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumberType {
    #[default]
    #[serde(rename = "2digit")]
    TwoDigit,
    #[serde(rename = "3digit")]
    ThreeDigit,
}

impl NumberType {
    /// All known number types, in display order
    pub const ALL: [NumberType; 2] = [NumberType::TwoDigit, NumberType::ThreeDigit];

    /// Number of digits a value of this type must have
    pub fn digits(&self) -> usize {
        match self {
            NumberType::TwoDigit => 2,
            NumberType::ThreeDigit => 3,
        }
    }

    /// Wire name used by the service
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberType::TwoDigit => "2digit",
            NumberType::ThreeDigit => "3digit",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            NumberType::TwoDigit => "2 digits",
            NumberType::ThreeDigit => "3 digits",
        }
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2digit" | "2" | "two" => Ok(NumberType::TwoDigit),
            "3digit" | "3" | "three" => Ok(NumberType::ThreeDigit),
            other => Err(format!("Unknown number type: {} (expected 2digit or 3digit)", other)),
        }
    }
}

/// A lottery draw period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub draw_date: NaiveDate,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One recorded bet
///
/// Created, updated and deleted only through the service; anything held
/// locally is a cached copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub round_id: RoundId,
    pub number_value: String,
    pub number_type: NumberType,
    #[serde(deserialize_with = "de_amount")]
    pub price: f64,
    /// Computed by the service from the round's limits
    #[serde(default)]
    pub is_over_limit: bool,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub recorded_by: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entry {
    /// Overlay the fields present in a patch onto this entry
    pub fn apply_patch(&mut self, patch: &EntryPatch) {
        if let Some(number_value) = &patch.number_value {
            self.number_value = number_value.clone();
        }
        if let Some(number_type) = patch.number_type {
            self.number_type = number_type;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(recorded_by) = &patch.recorded_by {
            self.recorded_by = Some(recorded_by.clone());
        }
    }
}

/// Payload for creating an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    pub round_id: RoundId,
    pub number_value: String,
    pub number_type: NumberType,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
}

impl NewEntry {
    /// Create a two-digit entry payload
    pub fn new(round_id: RoundId, number_value: impl Into<String>, price: f64) -> Self {
        Self {
            round_id,
            number_value: number_value.into(),
            number_type: NumberType::TwoDigit,
            price,
            recorded_by: None,
        }
    }

    /// Builder method: set the number type
    pub fn number_type(mut self, number_type: NumberType) -> Self {
        self.number_type = number_type;
        self
    }

    /// Builder method: set the operator who recorded the bet
    pub fn recorded_by(mut self, name: Option<String>) -> Self {
        self.recorded_by = name;
        self
    }
}

/// Partial update of an entry; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_type: Option<NumberType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
}

impl EntryPatch {
    /// Builder method: change the number
    pub fn number_value(mut self, value: impl Into<String>) -> Self {
        self.number_value = Some(value.into());
        self
    }

    /// Builder method: change the number type
    pub fn number_type(mut self, number_type: NumberType) -> Self {
        self.number_type = Some(number_type);
        self
    }

    /// Builder method: change the price
    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder method: change the recording operator
    pub fn recorded_by(mut self, name: impl Into<String>) -> Self {
        self.recorded_by = Some(name.into());
        self
    }

    /// True if no field would change
    pub fn is_empty(&self) -> bool {
        self.number_value.is_none()
            && self.number_type.is_none()
            && self.price.is_none()
            && self.recorded_by.is_none()
    }
}

/// One page of a round's entries as reported by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    /// Total entries in the round, authoritative
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Maximum aggregate wager per number type in a round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceLimit {
    pub id: LimitId,
    pub round_id: RoundId,
    pub number_type: NumberType,
    #[serde(deserialize_with = "de_amount")]
    pub limit_amount: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payload for creating or replacing a limit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewLimit {
    pub round_id: RoundId,
    pub number_type: NumberType,
    pub limit_amount: f64,
}

/// Aggregate wagers on one number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumberSummary {
    pub number_value: String,
    pub number_type: NumberType,
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub limit_amount: f64,
    #[serde(default)]
    pub is_over_limit: bool,
}

/// Aggregate figures for a whole round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundSummary {
    pub round_id: RoundId,
    pub draw_date: NaiveDate,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_amount: f64,
    #[serde(default)]
    pub over_limit_count: u64,
}

/// Decode an amount sent either as a JSON number or as a numeric string.
///
/// Decimal columns arrive as strings from some deployments. Anything that
/// does not parse counts as zero.
fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
        Null(()),
    }

    Ok(match Amount::deserialize(deserializer)? {
        Amount::Number(n) if n.is_finite() => n,
        Amount::Number(_) => 0.0,
        Amount::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0),
        Amount::Null(()) => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        Entry {
            id: 7,
            round_id: 1,
            number_value: "42".to_string(),
            number_type: NumberType::TwoDigit,
            price: 100.0,
            is_over_limit: false,
            customer_name: None,
            recorded_by: Some("somchai".to_string()),
            note: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_number_type_wire_names() {
        assert_eq!(serde_json::to_string(&NumberType::TwoDigit).unwrap(), "\"2digit\"");
        assert_eq!(
            serde_json::from_str::<NumberType>("\"3digit\"").unwrap(),
            NumberType::ThreeDigit
        );
        assert_eq!(NumberType::ThreeDigit.digits(), 3);
        assert_eq!("2".parse::<NumberType>().unwrap(), NumberType::TwoDigit);
        assert!("4digit".parse::<NumberType>().is_err());
    }

    #[test]
    fn test_entry_decodes_string_amounts() {
        let json = r#"{
            "id": 1, "round_id": 2, "number_value": "05", "number_type": "2digit",
            "price": "150.50", "is_over_limit": true, "customer_name": null,
            "recorded_by": null, "note": null,
            "created_at": "2025-01-16T10:00:00", "updated_at": "2025-01-16T10:00:00"
        }"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.price, 150.5);
        assert!(entry.is_over_limit);
        assert_eq!(entry.recorded_by, None);
    }

    #[test]
    fn test_summary_defaults_bad_amount_to_zero() {
        let json = r#"{"number_value": "12", "number_type": "2digit",
            "total_entries": 3, "total_amount": "n/a", "limit_amount": null,
            "is_over_limit": false}"#;
        let summary: NumberSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.total_amount, 0.0);
        assert_eq!(summary.limit_amount, 0.0);
    }

    #[test]
    fn test_apply_patch_keeps_absent_fields() {
        let mut entry = sample_entry();
        entry.apply_patch(&EntryPatch::default().price(250.0));
        assert_eq!(entry.price, 250.0);
        assert_eq!(entry.number_value, "42");
        assert_eq!(entry.recorded_by.as_deref(), Some("somchai"));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = EntryPatch::default().number_value("09");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"number_value": "09"}));
        assert!(EntryPatch::default().is_empty());
    }

    #[test]
    fn test_round_parses_draw_date() {
        let json = r#"{"id": 3, "draw_date": "2025-02-01", "status": "open", "is_active": true}"#;
        let round: Round = serde_json::from_str(json).unwrap();
        assert_eq!(round.draw_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(round.is_active);
    }
}
