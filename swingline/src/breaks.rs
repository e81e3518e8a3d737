use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candle::Candle;
use crate::config::DetectionConfig;
use crate::constant::{Const, EventKind, StructureLabel, SwingKind, ValidationError};
use crate::swing::{detect_swings, Swing};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureEvent {
    pub candle_index: usize,
    pub candle_time: i64,
    pub price: f64,
    pub kind: EventKind,
    pub confidence: f64,
    pub previous: StructureLabel,
    pub current: StructureLabel,
    /// Price of the previous confirmed swing of the current swing's kind.
    pub reference_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StructureLabel,
    pub to: StructureLabel,
    pub kind: EventKind,
}

/// Table-driven classifier over adjacent pairs of chronological swings.
#[derive(Debug, Clone, Copy)]
pub struct BreakClassifier {
    pub transitions: &'static [Transition],
    pub confidence: f64,
}

pub const BOS: BreakClassifier = BreakClassifier {
    transitions: &[
        Transition {
            from: StructureLabel::HigherLow,
            to: StructureLabel::HigherHigh,
            kind: EventKind::BosBullish,
        },
        Transition {
            from: StructureLabel::LowerHigh,
            to: StructureLabel::LowerLow,
            kind: EventKind::BosBearish,
        },
    ],
    confidence: Const::BOS_CONFIDENCE,
};

pub const MSB: BreakClassifier = BreakClassifier {
    transitions: &[
        Transition {
            from: StructureLabel::LowerLow,
            to: StructureLabel::HigherLow,
            kind: EventKind::MsbBullish,
        },
        Transition {
            from: StructureLabel::HigherHigh,
            to: StructureLabel::LowerHigh,
            kind: EventKind::MsbBearish,
        },
    ],
    confidence: Const::MSB_CONFIDENCE,
};

impl BreakClassifier {
    pub fn lookup(&self, from: StructureLabel, to: StructureLabel) -> Option<EventKind> {
        self.transitions
            .iter()
            .find(|x| x.from == from && x.to == to)
            .map(|x| x.kind)
    }

    pub fn classify(&self, swings: &[Swing]) -> Vec<StructureEvent> {
        swings
            .windows(2)
            .enumerate()
            .filter_map(|(idx, pair)| {
                let (prev, current) = (&pair[0], &pair[1]);
                let kind = self.lookup(prev.structure, current.structure)?;
                Some(StructureEvent {
                    candle_index: current.candle_index,
                    candle_time: current.candle_time,
                    price: current.price,
                    kind,
                    confidence: self.confidence,
                    previous: prev.structure,
                    current: current.structure,
                    reference_price: previous_price_of(&swings[..=idx], current.kind),
                })
            })
            .collect()
    }
}

fn previous_price_of(swings: &[Swing], kind: SwingKind) -> Option<f64> {
    swings.iter().rev().find(|x| x.kind == kind).map(|x| x.price)
}

pub fn detect_bos(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<Vec<StructureEvent>, ValidationError> {
    let swings = detect_swings(candles, config)?;
    let events = BOS.classify(&swings);
    debug!(swings = swings.len(), events = events.len(), "bos classified");
    Ok(events)
}

pub fn detect_msb(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<Vec<StructureEvent>, ValidationError> {
    let swings = detect_swings(candles, config)?;
    let events = MSB.classify(&swings);
    debug!(swings = swings.len(), events = events.len(), "msb classified");
    Ok(events)
}

/// BOS and MSB events over already confirmed swings, merged in chronological order.
pub fn classify_breaks(swings: &[Swing]) -> Vec<StructureEvent> {
    let mut events = BOS.classify(swings);
    events.extend(MSB.classify(swings));
    events.sort_by_key(|x| (x.candle_time, x.candle_index));
    events
}

pub fn detect_structure_breaks(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<Vec<StructureEvent>, ValidationError> {
    let swings = detect_swings(candles, config)?;
    Ok(classify_breaks(&swings))
}

pub fn latest_bos(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<Option<StructureEvent>, ValidationError> {
    Ok(detect_bos(candles, config)?.pop())
}

pub fn latest_msb(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<Option<StructureEvent>, ValidationError> {
    Ok(detect_msb(candles, config)?.pop())
}
