//! Pure grouping of silver records into daily summaries

use lake_common::{DailySummary, SilverRecord};
use std::collections::BTreeMap;

/// Category used for records without one
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug)]
struct Accumulator {
    count: i64,
    total: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(amount: f64) -> Self {
        Self {
            count: 1,
            total: amount,
            min: amount,
            max: amount,
        }
    }

    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.total += amount;
        self.min = self.min.min(amount);
        self.max = self.max.max(amount);
    }
}

/// Summarize VALID records, ordered by (date, type, category)
///
/// Flagged records are excluded entirely.
pub fn summarize(records: &[SilverRecord]) -> Vec<DailySummary> {
    let mut groups: BTreeMap<(String, String, String), Accumulator> = BTreeMap::new();

    for record in records.iter().filter(|r| r.validation_status.is_valid()) {
        let key = (
            record.transaction_date.clone(),
            record.transaction_type.clone(),
            record
                .category
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        );
        groups
            .entry(key)
            .and_modify(|acc| acc.add(record.amount))
            .or_insert_with(|| Accumulator::new(record.amount));
    }

    groups
        .into_iter()
        .map(|((summary_date, transaction_type, category), acc)| DailySummary {
            summary_date,
            transaction_type,
            category,
            transaction_count: acc.count,
            total_amount: acc.total,
            avg_amount: acc.total / acc.count as f64,
            min_amount: acc.min,
            max_amount: acc.max,
        })
        .collect()
}
