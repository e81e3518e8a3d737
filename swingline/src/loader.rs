use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::candle::{validate_series, Candle};
use crate::constant::DataError;

#[derive(Debug, Deserialize)]
struct CsvCandleRow {
    #[serde(default)]
    time: Option<i64>,
    #[serde(default, alias = "timestamp")]
    datetime: Option<String>,
    #[serde(alias = "open_price")]
    open: f64,
    #[serde(alias = "high_price")]
    high: f64,
    #[serde(alias = "low_price")]
    low: f64,
    #[serde(alias = "close_price")]
    close: f64,
}

impl CsvCandleRow {
    fn into_candle(self) -> Result<Candle, DataError> {
        let time = match (self.time, self.datetime.as_deref()) {
            (Some(time), _) => time,
            (None, Some(raw)) => parse_datetime(raw)?.timestamp(),
            (None, None) => return Err(DataError::InvalidDatetime(String::new())),
        };
        Ok(Candle::new(time, self.open, self.high, self.low, self.close))
    }
}

/// Reads a CSV candle file and validates the series before returning it.
pub fn load_candles(file_path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    let reader = csv::Reader::from_path(file_path)?;
    read_candles(reader)
}

pub fn load_candles_from_str(data: &str) -> Result<Vec<Candle>, DataError> {
    read_candles(csv::Reader::from_reader(data.as_bytes()))
}

fn read_candles<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Candle>, DataError> {
    let mut out = Vec::new();
    for row in reader.deserialize::<CsvCandleRow>() {
        out.push(row?.into_candle()?);
    }
    validate_series(&out)?;
    debug!(rows = out.len(), "candles loaded");
    Ok(out)
}

pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let patterns = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y%m%d%H%M%S%.f",
    ];

    for pattern in patterns {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(DataError::InvalidDatetime(value.to_string()))
}
