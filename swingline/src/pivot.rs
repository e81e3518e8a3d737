//! Pivot 扫描。
//!
//! 以固定对称窗口 `lookback` 在 candle 序列上寻找局部极值候选：
//! 左右两侧各 `lookback` 根 candle 都必须严格劣于中心 candle，平价不成立。

use serde::{Deserialize, Serialize};

use crate::candle::Candle;
use crate::constant::{DetectionMode, PivotKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub kind: PivotKind,
    pub price: f64,
    pub time: i64,
}

pub fn is_pivot(
    candles: &[Candle],
    index: usize,
    kind: PivotKind,
    mode: DetectionMode,
    lookback: usize,
) -> bool {
    if lookback == 0 || index < lookback || index + lookback >= candles.len() {
        return false;
    }

    let center = candles[index].pivot_price(kind, mode);
    let beats = |other: &Candle| {
        let value = other.pivot_price(kind, mode);
        match kind {
            PivotKind::High => center > value,
            PivotKind::Low => center < value,
        }
    };

    candles[index - lookback..index].iter().all(beats)
        && candles[index + 1..=index + lookback].iter().all(beats)
}

/// Returns pivots ordered by index; a candle that is both a high and a low
/// pivot yields the high first.
pub fn scan_pivots(candles: &[Candle], mode: DetectionMode, lookback: usize) -> Vec<Pivot> {
    let lookback = lookback.max(1);
    if candles.len() < 2 * lookback + 1 {
        return Vec::new();
    }

    let mut pivots = Vec::new();
    for index in lookback..candles.len() - lookback {
        for kind in [PivotKind::High, PivotKind::Low] {
            if is_pivot(candles, index, kind, mode, lookback) {
                pivots.push(Pivot {
                    index,
                    kind,
                    price: candles[index].pivot_price(kind, mode),
                    time: candles[index].time,
                });
            }
        }
    }
    pivots
}
