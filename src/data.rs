//! Candle ingestion from CSV files.
//!
//! Columns are `timestamp, open, high, low, close, volume`. The timestamp
//! column accepts either a raw integer millisecond value or an RFC3339 /
//! `%Y-%m-%d %H:%M:%S` datetime string, mirroring the fallback chain the
//! original data loader used for its `datetime` column.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::DataError;
use crate::types::Candle;

fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Some(dt.timestamp_millis());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc).timestamp_millis())
        .ok()
}

/// Loads candles from a CSV file, sorted by the file's own row order (the
/// caller is responsible for ensuring rows are chronological).
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    let path_ref = path.as_ref();
    let path_str = path_ref.display().to_string();

    let mut reader = csv::Reader::from_path(path_ref).map_err(|e| DataError::Open {
        path: path_str.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e),
    })?;

    let mut candles = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| DataError::Row {
            path: path_str.clone(),
            line: row_idx + 2, // +1 for header, +1 for 1-indexing
            source,
        })?;

        let ts_raw = record.get(0).unwrap_or_default();
        let timestamp_ms = parse_timestamp_ms(ts_raw).ok_or_else(|| DataError::Timestamp {
            path: path_str.clone(),
            raw: ts_raw.to_string(),
        })?;

        let field = |idx: usize| -> f64 {
            record.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0.0)
        };

        candles.push(Candle::new(
            timestamp_ms,
            field(1),
            field(2),
            field(3),
            field(4),
            field(5),
        ));
    }

    if candles.is_empty() {
        return Err(DataError::Empty { path: path_str });
    }

    Ok(candles)
}

/// Structural sanity checks on a loaded candle series: non-crossed
/// high/low, positive close, non-negative volume, strictly increasing
/// timestamps.
pub fn validate_candles(candles: &[Candle]) -> ValidationResult {
    let mut errors = Vec::new();

    if candles.is_empty() {
        errors.push("no candles provided".to_string());
        return ValidationResult { errors };
    }

    for (i, candle) in candles.iter().enumerate() {
        if candle.high < candle.low {
            errors.push(format!("candle {i}: high ({}) < low ({})", candle.high, candle.low));
        }
        if candle.close <= 0.0 {
            errors.push(format!("candle {i}: non-positive close ({})", candle.close));
        }
        if candle.volume < 0.0 {
            errors.push(format!("candle {i}: negative volume ({})", candle.volume));
        }
        if i > 0 && candle.timestamp_ms <= candles[i - 1].timestamp_ms {
            errors.push(format!("candle {i}: timestamp does not strictly increase"));
        }
    }

    ValidationResult { errors }
}

#[derive(Debug)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
