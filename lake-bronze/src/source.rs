//! Source file reading and row coercion

use csv::{ReaderBuilder, StringRecord};
use lake_common::timestamp::split_timestamp;
use lake_common::{BronzeRecord, Error, RejectReason, Result, RowRejection};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Header fields every source file must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "transaction_id",
    "customer_id",
    "timestamp",
    "amount",
    "transaction_type",
    "merchant",
    "category",
    "status",
];

/// Rows read from one source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    /// Coerced rows, in file order
    pub records: Vec<BronzeRecord>,
    /// Rows that could not be coerced
    pub rejected: Vec<RowRejection>,
}

/// Position of each required field in the source header
///
/// Extra columns are allowed and ignored; column order does not matter.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<&'static str, usize>,
}

impl HeaderIndex {
    /// Validate a header row
    ///
    /// Fails with `Error::EmptyHeader` when there is no header and
    /// `Error::MissingColumns` listing every absent required field.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::EmptyHeader);
        }

        let mut positions = HashMap::with_capacity(REQUIRED_COLUMNS.len());
        let mut missing = Vec::new();
        for name in REQUIRED_COLUMNS {
            match headers.iter().position(|h| h.trim() == name) {
                Some(idx) => {
                    positions.insert(name, idx);
                }
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    /// Raw field value; `None` when the row is too short to contain it
    fn raw<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.positions.get(name).and_then(|&idx| record.get(idx))
    }

    /// Coerce one data row
    ///
    /// - transaction_id, timestamp and amount must be non-blank
    /// - timestamp must split into a date and time of day
    /// - amount must parse as a finite number
    /// - customer_id, merchant and category are trimmed; blank becomes `None`
    /// - transaction_type and status are kept as written
    pub fn parse_row(
        &self,
        record: &StringRecord,
        line: u64,
    ) -> std::result::Result<BronzeRecord, RowRejection> {
        let row_id = self.raw(record, "transaction_id").and_then(non_blank);
        let reject = |reason: RejectReason| RowRejection {
            line,
            transaction_id: row_id.clone(),
            reason,
        };
        let missing = |name: &str| reject(RejectReason::MissingField(name.to_string()));

        let mut fields = [""; REQUIRED_COLUMNS.len()];
        for (slot, &name) in REQUIRED_COLUMNS.iter().enumerate() {
            fields[slot] = self.raw(record, name).ok_or_else(|| missing(name))?;
        }
        let [_, customer_id, timestamp, amount, transaction_type, merchant, category, status] =
            fields;

        let transaction_id = row_id.clone().ok_or_else(|| missing("transaction_id"))?;
        let timestamp = non_blank(timestamp).ok_or_else(|| missing("timestamp"))?;
        let raw_amount = non_blank(amount).ok_or_else(|| missing("amount"))?;

        if split_timestamp(&transaction_id, &timestamp).is_err() {
            return Err(reject(RejectReason::InvalidTimestamp(timestamp)));
        }

        let amount = match raw_amount.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return Err(reject(RejectReason::InvalidAmount(raw_amount))),
        };

        Ok(BronzeRecord {
            transaction_id,
            customer_id: non_blank(customer_id),
            timestamp,
            amount,
            transaction_type: transaction_type.to_string(),
            merchant: non_blank(merchant),
            category: non_blank(category),
            status: status.to_string(),
        })
    }
}

/// Trimmed value, `None` when blank
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read and coerce a whole source file
///
/// Header problems and I/O failures are run-level errors. Row problems land
/// in `SourceBatch::rejected`.
pub fn read_source(path: &Path) -> Result<SourceBatch> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let index = HeaderIndex::from_headers(&headers)?;

    let mut batch = SourceBatch::default();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1
        let fallback_line = idx as u64 + 2;
        match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                match index.parse_row(&record, line) {
                    Ok(row) => batch.records.push(row),
                    Err(rejection) => batch.rejected.push(rejection),
                }
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                batch.rejected.push(RowRejection {
                    line,
                    transaction_id: None,
                    reason: RejectReason::Malformed(e.to_string()),
                });
            }
        }
    }

    debug!(
        "Read {} rows from {} ({} rejected)",
        batch.records.len() + batch.rejected.len(),
        path.display(),
        batch.rejected.len()
    );

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> StringRecord {
        StringRecord::from(REQUIRED_COLUMNS.to_vec())
    }

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_header_missing_amount_is_reported() {
        let headers = StringRecord::from(vec![
            "transaction_id",
            "customer_id",
            "timestamp",
            "transaction_type",
            "merchant",
            "category",
            "status",
        ]);
        match HeaderIndex::from_headers(&headers) {
            Err(Error::MissingColumns(missing)) => assert_eq!(missing, vec!["amount"]),
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_header_is_rejected() {
        let headers = StringRecord::new();
        assert!(matches!(
            HeaderIndex::from_headers(&headers),
            Err(Error::EmptyHeader)
        ));
    }

    #[test]
    fn test_header_accepts_reordered_and_extra_columns() {
        let mut names: Vec<&str> = REQUIRED_COLUMNS.iter().rev().copied().collect();
        names.push("ingest_note");
        let index = HeaderIndex::from_headers(&StringRecord::from(names)).unwrap();

        let record = index
            .parse_row(
                &row(&["done", "food", "StoreA", "purchase", "7", "2024-01-01 10:00:00", "CUST1", "T1", "x"]),
                2,
            )
            .unwrap();
        assert_eq!(record.transaction_id, "T1");
        assert_eq!(record.amount, 7.0);
        assert_eq!(record.status, "done");
    }

    #[test]
    fn test_parse_row_coerces_and_trims() {
        let index = HeaderIndex::from_headers(&header()).unwrap();
        let record = index
            .parse_row(
                &row(&[
                    "T1",
                    "  CUST1  ",
                    "2024-01-01 10:00:00",
                    "10.50",
                    "purchase",
                    "   ",
                    " food ",
                    "completed",
                ]),
                2,
            )
            .unwrap();

        assert_eq!(record.transaction_id, "T1");
        assert_eq!(record.customer_id.as_deref(), Some("CUST1"));
        assert_eq!(record.amount, 10.5);
        assert_eq!(record.merchant, None);
        assert_eq!(record.category.as_deref(), Some("food"));
    }

    #[test]
    fn test_parse_row_rejects_bad_amount() {
        let index = HeaderIndex::from_headers(&header()).unwrap();
        let rejection = index
            .parse_row(
                &row(&["T1", "CUST1", "2024-01-01 10:00:00", "ten", "purchase", "A", "B", "ok"]),
                5,
            )
            .unwrap_err();

        assert_eq!(rejection.line, 5);
        assert_eq!(rejection.transaction_id.as_deref(), Some("T1"));
        assert_eq!(rejection.reason, RejectReason::InvalidAmount("ten".to_string()));
    }

    #[test]
    fn test_parse_row_rejects_non_finite_amount() {
        let index = HeaderIndex::from_headers(&header()).unwrap();
        let rejection = index
            .parse_row(
                &row(&["T1", "CUST1", "2024-01-01 10:00:00", "NaN", "purchase", "A", "B", "ok"]),
                2,
            )
            .unwrap_err();
        assert!(matches!(rejection.reason, RejectReason::InvalidAmount(_)));
    }

    #[test]
    fn test_parse_row_rejects_unsplittable_timestamp() {
        let index = HeaderIndex::from_headers(&header()).unwrap();
        let rejection = index
            .parse_row(
                &row(&["T2", "CUST2", " not-a-date ", "1.0", "purchase", "A", "B", "ok"]),
                3,
            )
            .unwrap_err();

        assert_eq!(rejection.line, 3);
        assert_eq!(rejection.transaction_id.as_deref(), Some("T2"));
        assert_eq!(
            rejection.reason,
            RejectReason::InvalidTimestamp("not-a-date".to_string())
        );
    }

    #[test]
    fn test_parse_row_rejects_short_row() {
        let index = HeaderIndex::from_headers(&header()).unwrap();
        let rejection = index
            .parse_row(&row(&["T1", "CUST1", "2024-01-01 10:00:00", "1.0"]), 3)
            .unwrap_err();
        assert_eq!(
            rejection.reason,
            RejectReason::MissingField("transaction_type".to_string())
        );
    }

    #[test]
    fn test_parse_row_rejects_blank_transaction_id() {
        let index = HeaderIndex::from_headers(&header()).unwrap();
        let rejection = index
            .parse_row(
                &row(&[" ", "CUST1", "2024-01-01 10:00:00", "1.0", "purchase", "A", "B", "ok"]),
                2,
            )
            .unwrap_err();
        assert_eq!(rejection.transaction_id, None);
        assert_eq!(
            rejection.reason,
            RejectReason::MissingField("transaction_id".to_string())
        );
    }
}
