//! 区间识别。
//!
//! 以已确认的 swing high 与其后第一个 swing low 作为区间上下沿，
//! 从较晚的一端开始向后统计触碰次数，直到价格越过某一沿或超出 `max_range_bars`。

use serde::{Deserialize, Serialize};

use crate::candle::Candle;
use crate::swing::Swing;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Touch distance in percent of the range height.
    pub touch_tolerance_pct: f64,
    pub min_touches: usize,
    pub min_range_bars: usize,
    pub max_range_bars: usize,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            touch_tolerance_pct: 0.3,
            min_touches: 3,
            min_range_bars: 10,
            max_range_bars: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Forming,
    Confirmed,
    BrokenUp,
    BrokenDown,
}

/// Retracement levels measured from the range low (0) to the range high (100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibLevels {
    pub range_low: f64,
    pub range_high: f64,
}

impl FibLevels {
    pub fn new(range_low: f64, range_high: f64) -> Self {
        Self {
            range_low,
            range_high,
        }
    }

    pub fn level(&self, pct: f64) -> f64 {
        self.range_low + (self.range_high - self.range_low) * pct / 100.0
    }

    pub fn fib_0(&self) -> f64 {
        self.range_low
    }

    pub fn fib_25(&self) -> f64 {
        self.level(25.0)
    }

    pub fn fib_50(&self) -> f64 {
        self.level(50.0)
    }

    pub fn fib_75(&self) -> f64 {
        self.level(75.0)
    }

    pub fn fib_100(&self) -> f64 {
        self.range_high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingRange {
    pub high: f64,
    pub low: f64,
    pub start_index: usize,
    /// Breakout candle, or the last candle scanned while still inside.
    pub end_index: usize,
    pub high_touches: usize,
    pub low_touches: usize,
    pub status: RangeStatus,
    pub high_swing: Swing,
    pub low_swing: Swing,
}

impl TradingRange {
    pub fn fib(&self) -> FibLevels {
        FibLevels::new(self.low, self.high)
    }

    pub fn height(&self) -> f64 {
        self.high - self.low
    }

    pub fn height_pct(&self) -> f64 {
        self.height() / self.low * 100.0
    }

    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn total_touches(&self) -> usize {
        self.high_touches + self.low_touches
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, RangeStatus::Forming | RangeStatus::Confirmed)
    }

    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }

    pub fn at_level(&self, price: f64, pct: f64, tolerance_pct: f64) -> bool {
        (price - self.fib().level(pct)).abs() <= self.height() * tolerance_pct / 100.0
    }

    pub fn at_75_level(&self, price: f64, tolerance_pct: f64) -> bool {
        self.at_level(price, 75.0, tolerance_pct)
    }

    pub fn at_25_level(&self, price: f64, tolerance_pct: f64) -> bool {
        self.at_level(price, 25.0, tolerance_pct)
    }
}

/// Ranges opened by every swing high and the first swing low after it,
/// keeping those with at least `min_touches` edge touches.
pub fn detect_ranges(
    candles: &[Candle],
    swings: &[Swing],
    config: &RangeConfig,
) -> Vec<TradingRange> {
    if swings.len() < 2 {
        return Vec::new();
    }

    swings[..swings.len() - 1]
        .iter()
        .filter(|x| x.is_high())
        .filter_map(|high| {
            let low = swings
                .iter()
                .find(|x| x.is_low() && x.candle_index > high.candle_index)?;
            build_range(candles, high, low, config)
        })
        .filter(|x| x.total_touches() >= config.min_touches)
        .collect()
}

/// Most recent range that price has not broken out of.
pub fn detect_current_range(
    candles: &[Candle],
    swings: &[Swing],
    config: &RangeConfig,
) -> Option<TradingRange> {
    detect_ranges(candles, swings, config)
        .into_iter()
        .rev()
        .find(|x| x.is_active())
}

fn build_range(
    candles: &[Candle],
    high_swing: &Swing,
    low_swing: &Swing,
    config: &RangeConfig,
) -> Option<TradingRange> {
    let start_index = high_swing.candle_index.min(low_swing.candle_index);
    let end_index = high_swing.candle_index.max(low_swing.candle_index);
    let (high, low) = (high_swing.price, low_swing.price);
    if end_index - start_index < config.min_range_bars
        || high <= low
        || end_index >= candles.len()
    {
        return None;
    }

    let tolerance = (high - low) * config.touch_tolerance_pct / 100.0;
    let scan_end = end_index.saturating_add(config.max_range_bars).min(candles.len());
    let mut range = TradingRange {
        high,
        low,
        start_index,
        end_index: candles.len() - 1,
        high_touches: 0,
        low_touches: 0,
        status: RangeStatus::Forming,
        high_swing: *high_swing,
        low_swing: *low_swing,
    };

    for (i, candle) in candles.iter().enumerate().take(scan_end).skip(end_index) {
        if candle.high >= high - tolerance {
            range.high_touches += 1;
        }
        if candle.low <= low + tolerance {
            range.low_touches += 1;
        }

        let broken = if candle.high > high + tolerance {
            Some(RangeStatus::BrokenUp)
        } else if candle.low < low - tolerance {
            Some(RangeStatus::BrokenDown)
        } else {
            None
        };
        if let Some(status) = broken {
            range.status = status;
            range.end_index = i;
            return Some(range);
        }
    }

    if range.total_touches() >= config.min_touches {
        range.status = RangeStatus::Confirmed;
    }
    Some(range)
}
