//! Swing 确认。
//!
//! Pivot 只是候选；只有当后续反向 pivot 越过上一个已确认的反向极值时，
//! 挂起的候选才被确认为 swing，并按同类上一个已确认 swing 打上结构标签。
//! 扫描结束时仍处于挂起状态的候选不会输出。

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::candle::{validate_series, Candle};
use crate::config::DetectionConfig;
use crate::constant::{Const, PivotKind, StructureLabel, SwingKind, ValidationError};
use crate::pivot::{scan_pivots, Pivot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub candle_index: usize,
    pub candle_time: i64,
    pub price: f64,
    pub kind: SwingKind,
    pub structure: StructureLabel,
    pub confidence: f64,
    /// Index of the opposite pivot whose break confirmed this swing.
    pub confirmed_at_index: usize,
    pub confirmed_at_time: i64,
}

impl Swing {
    pub fn is_high(&self) -> bool {
        self.kind == SwingKind::SwingHigh
    }

    pub fn is_low(&self) -> bool {
        self.kind == SwingKind::SwingLow
    }
}

/// Scan state between two pivots. `step` never mutates in place, so every
/// intermediate state of a run can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfirmState {
    pub last_confirmed_high: Option<Pivot>,
    pub last_confirmed_low: Option<Pivot>,
    pub pending_high: Option<Pivot>,
    pub pending_low: Option<Pivot>,
}

impl ConfirmState {
    pub fn step(&self, pivot: &Pivot) -> (Self, Option<Swing>) {
        let mut next = *self;
        let confirmed = match pivot.kind {
            PivotKind::High => {
                let breaks = self.last_confirmed_high.map_or(0.0, |x| x.price);
                let confirmed = self
                    .pending_low
                    .filter(|_| pivot.price > breaks)
                    .map(|low| {
                        next.last_confirmed_low = Some(low);
                        next.pending_low = None;
                        confirm(&low, self.last_confirmed_low.as_ref(), pivot)
                    });

                // 平价保留较早的候选
                if next.pending_high.is_none_or(|x| pivot.price > x.price) {
                    next.pending_high = Some(*pivot);
                }
                confirmed
            }
            PivotKind::Low => {
                let breaks = self.last_confirmed_low.map_or(f64::INFINITY, |x| x.price);
                let confirmed = self
                    .pending_high
                    .filter(|_| pivot.price < breaks)
                    .map(|high| {
                        next.last_confirmed_high = Some(high);
                        next.pending_high = None;
                        confirm(&high, self.last_confirmed_high.as_ref(), pivot)
                    });

                if next.pending_low.is_none_or(|x| pivot.price < x.price) {
                    next.pending_low = Some(*pivot);
                }
                confirmed
            }
        };
        (next, confirmed)
    }
}

fn confirm(candidate: &Pivot, previous: Option<&Pivot>, breaker: &Pivot) -> Swing {
    Swing {
        candle_index: candidate.index,
        candle_time: candidate.time,
        price: candidate.price,
        kind: candidate.kind.into(),
        structure: structure_label(candidate.kind, candidate.price, previous),
        confidence: Const::SWING_CONFIDENCE,
        confirmed_at_index: breaker.index,
        confirmed_at_time: breaker.time,
    }
}

pub fn structure_label(kind: PivotKind, price: f64, previous: Option<&Pivot>) -> StructureLabel {
    match (kind, previous) {
        (PivotKind::High, None) => StructureLabel::FirstHigh,
        (PivotKind::High, Some(prev)) if price > prev.price => StructureLabel::HigherHigh,
        (PivotKind::High, Some(_)) => StructureLabel::LowerHigh,
        (PivotKind::Low, None) => StructureLabel::FirstLow,
        (PivotKind::Low, Some(prev)) if price > prev.price => StructureLabel::HigherLow,
        (PivotKind::Low, Some(_)) => StructureLabel::LowerLow,
    }
}

/// Folds pivots (re-ordered by index) into swings in confirmation order.
pub fn fold_pivots(pivots: &[Pivot]) -> (ConfirmState, Vec<Swing>) {
    let mut ordered = pivots.to_vec();
    ordered.sort_by_key(|x| x.index);

    ordered
        .iter()
        .fold((ConfirmState::default(), Vec::new()), |(state, mut swings), pivot| {
            let (next, confirmed) = state.step(pivot);
            swings.extend(confirmed);
            (next, swings)
        })
}

pub fn confirm_pivots(pivots: &[Pivot]) -> Vec<Swing> {
    let (_, mut swings) = fold_pivots(pivots);
    sort_chronologically(&mut swings);
    swings
}

fn sort_chronologically(swings: &mut [Swing]) {
    swings.sort_by_key(|x| (x.candle_time, x.candle_index));
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureScan {
    pub swings: Vec<Swing>,
    /// Candidates still waiting for a break when the series ended.
    pub pending_high: Option<Pivot>,
    pub pending_low: Option<Pivot>,
}

pub fn scan_structure(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<StructureScan, ValidationError> {
    if let Err(err) = validate_series(candles) {
        warn!("rejecting candle series: {err}");
        return Err(err);
    }

    let pivots = scan_pivots(candles, config.mode, config.lookback);
    let (state, mut swings) = fold_pivots(&pivots);
    sort_chronologically(&mut swings);
    debug!(
        candles = candles.len(),
        pivots = pivots.len(),
        swings = swings.len(),
        mode = config.mode.as_str(),
        "swing scan finished"
    );

    Ok(StructureScan {
        swings,
        pending_high: state.pending_high,
        pending_low: state.pending_low,
    })
}

pub fn detect_swings(
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<Vec<Swing>, ValidationError> {
    scan_structure(candles, config).map(|x| x.swings)
}

pub fn latest_swing_high(swings: &[Swing]) -> Option<&Swing> {
    swings.iter().rev().find(|x| x.is_high())
}

pub fn latest_swing_low(swings: &[Swing]) -> Option<&Swing> {
    swings.iter().rev().find(|x| x.is_low())
}

#[cfg(test)]
mod tests {
    use super::{confirm_pivots, fold_pivots, ConfirmState};
    use crate::constant::{PivotKind, StructureLabel, SwingKind};
    use crate::pivot::Pivot;

    fn pivot(index: usize, kind: PivotKind, price: f64) -> Pivot {
        Pivot {
            index,
            kind,
            price,
            time: index as i64 * 60,
        }
    }

    #[test]
    fn first_high_is_confirmed_by_any_low() {
        let state = ConfirmState::default();
        let (state, swing) = state.step(&pivot(4, PivotKind::High, 21.0));
        assert!(swing.is_none());
        assert_eq!(state.pending_high.map(|x| x.index), Some(4));

        let (state, swing) = state.step(&pivot(8, PivotKind::Low, 11.0));
        let swing = swing.expect("first low should confirm the pending high");
        assert_eq!(swing.candle_index, 4);
        assert_eq!(swing.kind, SwingKind::SwingHigh);
        assert_eq!(swing.structure, StructureLabel::FirstHigh);
        assert_eq!(swing.confirmed_at_index, 8);
        assert_eq!(state.pending_high, None);
        assert_eq!(state.last_confirmed_high.map(|x| x.index), Some(4));
        assert_eq!(state.pending_low.map(|x| x.index), Some(8));
    }

    #[test]
    fn step_leaves_previous_state_untouched() {
        let before = ConfirmState::default();
        let (after, _) = before.step(&pivot(4, PivotKind::High, 21.0));
        assert_eq!(before, ConfirmState::default());
        assert_ne!(before, after);
    }

    #[test]
    fn equal_pending_high_keeps_earlier_candidate() {
        let (state, _) = fold_pivots(&[
            pivot(4, PivotKind::High, 21.0),
            pivot(9, PivotKind::High, 21.0),
        ]);
        assert_eq!(state.pending_high.map(|x| x.index), Some(4));

        let (state, _) = fold_pivots(&[
            pivot(4, PivotKind::High, 21.0),
            pivot(9, PivotKind::High, 21.5),
        ]);
        assert_eq!(state.pending_high.map(|x| x.index), Some(9));
    }

    #[test]
    fn high_that_fails_to_break_keeps_low_pending() {
        let (state, swings) = fold_pivots(&[
            pivot(4, PivotKind::High, 21.0),
            pivot(8, PivotKind::Low, 11.0),
            pivot(12, PivotKind::High, 20.0),
        ]);
        assert_eq!(swings.len(), 1);
        assert_eq!(state.pending_low.map(|x| x.index), Some(8));
        assert_eq!(state.pending_high.map(|x| x.index), Some(12));
    }

    #[test]
    fn unordered_pivots_are_resorted_by_index() {
        let swings = confirm_pivots(&[
            pivot(8, PivotKind::Low, 11.0),
            pivot(4, PivotKind::High, 21.0),
        ]);
        assert_eq!(swings.len(), 1);
        assert_eq!(swings[0].candle_index, 4);
    }
}
