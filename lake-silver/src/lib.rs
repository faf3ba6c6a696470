//! Silver Promoter
//!
//! Copies bronze records that silver has not seen yet, splits their timestamp,
//! attaches a validation verdict, and appends them to silver in one batch.
//! Re-running against unchanged bronze data writes nothing.

pub mod promote;
pub mod transform;

pub use promote::{new_records, promote, promote_files, run_promotion, PromotionReport};
pub use transform::{split_timestamp, to_silver, verdict, violations, CUSTOMER_ID_PREFIX};
