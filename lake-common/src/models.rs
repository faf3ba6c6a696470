//! Transaction record models for each tier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw transaction as ingested into bronze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BronzeRecord {
    pub transaction_id: String,
    pub customer_id: Option<String>,
    /// Combined date and time, kept verbatim from the source file
    pub timestamp: String,
    pub amount: f64,
    pub transaction_type: String,
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub status: String,
}

/// Validated and annotated transaction in silver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilverRecord {
    pub transaction_id: String,
    pub customer_id: Option<String>,
    pub transaction_date: String,
    pub transaction_time: String,
    pub amount: f64,
    pub transaction_type: String,
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub validation_status: ValidationStatus,
}

/// Per-day aggregate in gold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub summary_date: String,
    pub transaction_type: String,
    pub category: String,
    pub transaction_count: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
}

/// Validation verdict stored with every silver record
///
/// Exactly one value per record. The string forms are consumed downstream
/// and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ValidationStatus {
    Valid,
    NegativeAmount,
    InvalidCustomerId,
}

impl ValidationStatus {
    pub const ALL: [ValidationStatus; 3] = [
        ValidationStatus::Valid,
        ValidationStatus::NegativeAmount,
        ValidationStatus::InvalidCustomerId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::NegativeAmount => "INVALID: Negative amount",
            ValidationStatus::InvalidCustomerId => "INVALID: Invalid customer ID",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown validation status '{}'", s))
    }
}

impl From<ValidationStatus> for String {
    fn from(status: ValidationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl TryFrom<String> for ValidationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_status_strings() {
        assert_eq!(ValidationStatus::Valid.as_str(), "VALID");
        assert_eq!(ValidationStatus::NegativeAmount.as_str(), "INVALID: Negative amount");
        assert_eq!(
            ValidationStatus::InvalidCustomerId.as_str(),
            "INVALID: Invalid customer ID"
        );
    }

    #[test]
    fn test_validation_status_parses_own_strings() {
        for status in ValidationStatus::ALL {
            assert_eq!(status.as_str().parse::<ValidationStatus>(), Ok(status));
        }
        assert!("INVALID".parse::<ValidationStatus>().is_err());
    }

    #[test]
    fn test_validation_status_serializes_as_string() {
        let json = serde_json::to_string(&ValidationStatus::NegativeAmount).unwrap();
        assert_eq!(json, "\"INVALID: Negative amount\"");
    }
}
