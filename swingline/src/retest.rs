use serde::{Deserialize, Serialize};

use crate::breaks::StructureEvent;
use crate::candle::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetestConfig {
    /// Distance to the level that still counts as a touch, in percent of the level.
    pub tolerance_pct: f64,
    pub max_retest_bars: usize,
}

impl Default for RetestConfig {
    fn default() -> Self {
        Self {
            tolerance_pct: 0.3,
            max_retest_bars: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Retest {
    pub candle_index: usize,
    pub candle_time: i64,
    pub level: f64,
    pub price: f64,
}

/// First candle after the event that comes back to the broken level: lows
/// after a bullish event, highs after a bearish one.
pub fn find_retest(
    candles: &[Candle],
    event: &StructureEvent,
    config: &RetestConfig,
) -> Option<Retest> {
    let level = event.reference_price.unwrap_or(event.price);
    let tolerance = (level * config.tolerance_pct / 100.0).abs();
    let start = event.candle_index + 1;
    let end = start.saturating_add(config.max_retest_bars).min(candles.len());
    if start >= end {
        return None;
    }

    candles[start..end]
        .iter()
        .enumerate()
        .find_map(|(offset, candle)| {
            let price = if event.kind.is_bullish() {
                candle.low
            } else {
                candle.high
            };
            ((price - level).abs() <= tolerance).then_some(Retest {
                candle_index: start + offset,
                candle_time: candle.time,
                level,
                price,
            })
        })
}
