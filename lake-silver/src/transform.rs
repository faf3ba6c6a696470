//! Per-record transformation and validation

use lake_common::{BronzeRecord, Result, SilverRecord, ValidationStatus};

pub use lake_common::timestamp::split_timestamp;

/// Prefix every well-formed customer id starts with
pub const CUSTOMER_ID_PREFIX: &str = "CUST";

/// Every validation rule `record` violates, in evaluation order
///
/// Order: negative amount, then customer id format.
pub fn violations(record: &BronzeRecord) -> Vec<ValidationStatus> {
    let mut violated = Vec::new();

    if record.amount < 0.0 {
        violated.push(ValidationStatus::NegativeAmount);
    }

    let well_formed_customer = record
        .customer_id
        .as_deref()
        .is_some_and(|id| id.starts_with(CUSTOMER_ID_PREFIX));
    if !well_formed_customer {
        violated.push(ValidationStatus::InvalidCustomerId);
    }

    violated
}

/// The single stored verdict: the last violated rule, or `Valid`
///
/// When several rules fail only the last one evaluated is kept, so a record
/// with both a negative amount and a bad customer id is stored as
/// `InvalidCustomerId`. Downstream consumers rely on this precedence.
pub fn verdict(violated: &[ValidationStatus]) -> ValidationStatus {
    violated.last().copied().unwrap_or(ValidationStatus::Valid)
}

/// Build the silver record for `record`
///
/// Also returns the full list of violated rules.
pub fn to_silver(record: &BronzeRecord) -> Result<(SilverRecord, Vec<ValidationStatus>)> {
    let (transaction_date, transaction_time) =
        split_timestamp(&record.transaction_id, &record.timestamp)?;
    let violated = violations(record);

    let silver = SilverRecord {
        transaction_id: record.transaction_id.clone(),
        customer_id: record.customer_id.clone(),
        transaction_date,
        transaction_time,
        amount: record.amount,
        transaction_type: record.transaction_type.clone(),
        merchant: record.merchant.clone(),
        category: record.category.clone(),
        status: record.status.clone(),
        validation_status: verdict(&violated),
    };

    Ok((silver, violated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bronze(customer_id: Option<&str>, amount: f64) -> BronzeRecord {
        BronzeRecord {
            transaction_id: "T1".to_string(),
            customer_id: customer_id.map(str::to_string),
            timestamp: "2024-02-29 23:59:58".to_string(),
            amount,
            transaction_type: "purchase".to_string(),
            merchant: Some("StoreA".to_string()),
            category: Some("food".to_string()),
            status: "completed".to_string(),
        }
    }

    #[test]
    fn test_valid_record() {
        let record = bronze(Some("CUST1001"), 42.0);
        assert!(violations(&record).is_empty());
        assert_eq!(verdict(&violations(&record)), ValidationStatus::Valid);
    }

    #[test]
    fn test_zero_amount_is_valid() {
        let record = bronze(Some("CUST1001"), 0.0);
        assert_eq!(verdict(&violations(&record)), ValidationStatus::Valid);
    }

    #[test]
    fn test_negative_amount() {
        let record = bronze(Some("CUST2"), -5.0);
        assert_eq!(verdict(&violations(&record)), ValidationStatus::NegativeAmount);
    }

    #[test]
    fn test_invalid_customer_prefix_is_case_sensitive() {
        for id in [Some("NOPE3"), Some("cust3"), None] {
            let record = bronze(id, 5.0);
            assert_eq!(
                verdict(&violations(&record)),
                ValidationStatus::InvalidCustomerId,
                "customer_id {:?}",
                id
            );
        }
    }

    #[test]
    fn test_last_violation_wins() {
        let record = bronze(Some("NOPE"), -1.0);
        let violated = violations(&record);
        assert_eq!(
            violated,
            vec![
                ValidationStatus::NegativeAmount,
                ValidationStatus::InvalidCustomerId
            ]
        );
        assert_eq!(verdict(&violated), ValidationStatus::InvalidCustomerId);
    }

    #[test]
    fn test_to_silver_copies_fields() {
        let record = bronze(Some("CUST1"), 12.5);
        let (silver, violated) = to_silver(&record).unwrap();

        assert!(violated.is_empty());
        assert_eq!(silver.transaction_id, "T1");
        assert_eq!(silver.transaction_date, "2024-02-29");
        assert_eq!(silver.transaction_time, "23:59:58");
        assert_eq!(silver.amount, 12.5);
        assert_eq!(silver.merchant.as_deref(), Some("StoreA"));
        assert_eq!(silver.validation_status, ValidationStatus::Valid);
    }
}
