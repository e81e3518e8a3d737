use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constant::{CandleDefect, DetectionMode, PivotKind, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    /// Price compared when testing this candle as a pivot of `kind`.
    pub fn pivot_price(&self, kind: PivotKind, mode: DetectionMode) -> f64 {
        match (mode, kind) {
            (DetectionMode::Wicks, PivotKind::High) => self.high,
            (DetectionMode::Wicks, PivotKind::Low) => self.low,
            (DetectionMode::Closes, _) => self.close,
        }
    }

    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let defect = if ![self.open, self.high, self.low, self.close]
            .iter()
            .all(|x| x.is_finite())
        {
            Some(CandleDefect::NonFinitePrice)
        } else if self.high < self.low {
            Some(CandleDefect::HighBelowLow)
        } else if self.open > self.high || self.open < self.low {
            Some(CandleDefect::OpenOutOfRange)
        } else if self.close > self.high || self.close < self.low {
            Some(CandleDefect::CloseOutOfRange)
        } else {
            None
        };

        match defect {
            Some(defect) => Err(ValidationError::InvalidCandle {
                index,
                time: self.time,
                defect,
            }),
            None => Ok(()),
        }
    }
}

/// Checks every candle and that times strictly increase.
pub fn validate_series(candles: &[Candle]) -> Result<(), ValidationError> {
    let mut previous: Option<i64> = None;
    for (index, candle) in candles.iter().enumerate() {
        candle.validate(index)?;
        if let Some(previous) = previous {
            if candle.time <= previous {
                return Err(ValidationError::UnorderedTime {
                    index,
                    previous,
                    time: candle.time,
                });
            }
        }
        previous = Some(candle.time);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_series, Candle};
    use crate::constant::{CandleDefect, ValidationError};

    #[test]
    fn nan_close_is_rejected_with_index() {
        let candles = [
            Candle::new(60, 1.0, 2.0, 0.5, 1.5),
            Candle::new(120, 1.0, 2.0, 0.5, f64::NAN),
        ];

        assert_eq!(
            validate_series(&candles),
            Err(ValidationError::InvalidCandle {
                index: 1,
                time: 120,
                defect: CandleDefect::NonFinitePrice,
            })
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = Candle::new(0, 1.0, 0.5, 2.0, 1.0).validate(4).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCandle {
                index: 4,
                defect: CandleDefect::HighBelowLow,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_timestamp_is_rejected() {
        let candles = [
            Candle::new(60, 1.0, 2.0, 0.5, 1.5),
            Candle::new(60, 1.0, 2.0, 0.5, 1.5),
        ];

        assert_eq!(
            validate_series(&candles),
            Err(ValidationError::UnorderedTime {
                index: 1,
                previous: 60,
                time: 60,
            })
        );
    }

    #[test]
    fn datetime_follows_unix_seconds() {
        let candle = Candle::new(1_700_000_000, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(candle.datetime().map(|x| x.timestamp()), Some(1_700_000_000));
    }
}
