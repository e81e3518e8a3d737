use serde::{Deserialize, Serialize};

use crate::constant::StructureLabel;
use crate::swing::Swing;

const MIN_SWINGS: usize = 4;
const RECENT_SWINGS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Uptrend,
    Downtrend,
    Ranging,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructureCounts {
    pub higher_highs: usize,
    pub higher_lows: usize,
    pub lower_highs: usize,
    pub lower_lows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyLevels {
    pub last_swing_high: Option<f64>,
    pub last_swing_low: Option<f64>,
    pub prev_swing_high: Option<f64>,
    pub prev_swing_low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureAnalysis {
    pub trend: MarketTrend,
    pub key_levels: KeyLevels,
    pub counts: StructureCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentLevels {
    pub swing_high: Option<f64>,
    pub swing_low: Option<f64>,
}

pub fn analyze_structure(swings: &[Swing]) -> StructureAnalysis {
    if swings.len() < MIN_SWINGS {
        return StructureAnalysis {
            trend: MarketTrend::Unknown,
            key_levels: KeyLevels::default(),
            counts: StructureCounts::default(),
        };
    }

    let recent = &swings[swings.len().saturating_sub(RECENT_SWINGS)..];
    let mut counts = StructureCounts::default();
    for swing in recent {
        match swing.structure {
            StructureLabel::HigherHigh => counts.higher_highs += 1,
            StructureLabel::HigherLow => counts.higher_lows += 1,
            StructureLabel::LowerHigh => counts.lower_highs += 1,
            StructureLabel::LowerLow => counts.lower_lows += 1,
            StructureLabel::FirstHigh | StructureLabel::FirstLow => {}
        }
    }

    let trend = if counts.higher_highs >= 1 && counts.higher_lows >= 1 {
        MarketTrend::Uptrend
    } else if counts.lower_highs >= 1 && counts.lower_lows >= 1 {
        MarketTrend::Downtrend
    } else {
        MarketTrend::Ranging
    };

    let mut highs = swings.iter().filter(|x| x.is_high()).rev().map(|x| x.price);
    let mut lows = swings.iter().filter(|x| x.is_low()).rev().map(|x| x.price);
    let key_levels = KeyLevels {
        last_swing_high: highs.next(),
        prev_swing_high: highs.next(),
        last_swing_low: lows.next(),
        prev_swing_low: lows.next(),
    };

    StructureAnalysis {
        trend,
        key_levels,
        counts,
    }
}

pub fn current_levels(swings: &[Swing]) -> CurrentLevels {
    CurrentLevels {
        swing_high: swings.iter().rev().find(|x| x.is_high()).map(|x| x.price),
        swing_low: swings.iter().rev().find(|x| x.is_low()).map(|x| x.price),
    }
}
