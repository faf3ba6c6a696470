//! Transaction timestamp parsing
//!
//! Bronze keeps the timestamp text verbatim; silver stores it as separate date
//! and time-of-day columns. Both stages use `split_timestamp`, so bronze never
//! accepts a value silver cannot split.

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};

/// Time assigned to date-only timestamps
const MIDNIGHT: &str = "00:00:00";

/// Split a timestamp into date and time-of-day text
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.fraction]`, `HH:MM` times, a `T` separator, and
/// date-only values (treated as midnight). The returned parts are the original
/// text on either side of the separator, so joining them with that separator
/// reproduces the input.
pub fn split_timestamp(transaction_id: &str, timestamp: &str) -> Result<(String, String)> {
    let invalid = || Error::InvalidTimestamp {
        transaction_id: transaction_id.to_string(),
        value: timestamp.to_string(),
    };

    let value = timestamp.trim();
    let (date_part, time_part) = match value.find(|c: char| c == ' ' || c == 'T') {
        Some(idx) => (&value[..idx], Some(&value[idx + 1..])),
        None => (value, None),
    };

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())?;

    let time = match time_part {
        Some(time) => {
            NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
                .map_err(|_| invalid())?;
            time.to_string()
        }
        None => MIDNIGHT.to_string(),
    };

    Ok((date_part.to_string(), time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_space_separated() {
        let (date, time) = split_timestamp("T1", "2024-03-01 09:15:00").unwrap();
        assert_eq!(date, "2024-03-01");
        assert_eq!(time, "09:15:00");
    }

    #[test]
    fn test_split_keeps_fraction_and_t_separator() {
        let (date, time) = split_timestamp("T1", "2024-03-01T09:15:00.250").unwrap();
        assert_eq!(date, "2024-03-01");
        assert_eq!(time, "09:15:00.250");
    }

    #[test]
    fn test_split_date_only_is_midnight() {
        let (date, time) = split_timestamp("T1", "2024-03-01").unwrap();
        assert_eq!(date, "2024-03-01");
        assert_eq!(time, "00:00:00");
    }

    #[test]
    fn test_split_rejects_garbage() {
        for bad in ["yesterday", "not-a-date", "2024-13-01 10:00:00", "2024-03-01 25:00:00", ""] {
            match split_timestamp("T9", bad) {
                Err(Error::InvalidTimestamp {
                    transaction_id,
                    value,
                }) => {
                    assert_eq!(transaction_id, "T9");
                    assert_eq!(value, bad);
                }
                other => panic!("Expected InvalidTimestamp for {:?}, got {:?}", bad, other),
            }
        }
    }
}
