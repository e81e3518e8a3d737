use std::collections::HashMap;

use swingline::{
    classify_breaks, detect_swings, Candle, DetectionConfig, PivotKind, StructureLabel, Swing,
    SwingKind, ValidationError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub candles: usize,
    pub swings: usize,
    pub events: usize,
    pub prefixes_checked: usize,
    pub violations: Vec<String>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Re-derives every swing invariant from the raw candles. `prefix_step > 0`
/// also replays each `prefix_step`-long prefix and checks that nothing it
/// confirmed changes once more candles arrive.
pub fn audit_swings(
    candles: &[Candle],
    config: &DetectionConfig,
    prefix_step: usize,
) -> Result<AuditReport, ValidationError> {
    let swings = detect_swings(candles, config)?;
    let events = classify_breaks(&swings);
    let lookback = config.lookback.max(1);
    let mut violations = Vec::<String>::new();

    for pair in swings.windows(2) {
        if pair[0].candle_time > pair[1].candle_time {
            violations.push(format!(
                "SWING order violation: #{} after #{}",
                pair[1].candle_index, pair[0].candle_index
            ));
        }
    }

    let mut last_price = HashMap::<SwingKind, f64>::new();
    for swing in &swings {
        if let Some(message) = extremum_violation(candles, swing, config, lookback) {
            violations.push(message);
        }

        let expected = expected_label(swing, last_price.get(&swing.kind).copied());
        if swing.structure != expected {
            violations.push(format!(
                "SWING label mismatch at #{}: got {}, expected {}",
                swing.candle_index,
                swing.structure.as_str(),
                expected.as_str()
            ));
        }
        last_price.insert(swing.kind, swing.price);

        if swing.confirmed_at_index < swing.candle_index || swing.confirmed_at_index >= candles.len()
        {
            violations.push(format!(
                "SWING confirmation out of range at #{}: confirmed_at={}",
                swing.candle_index, swing.confirmed_at_index
            ));
        }
    }

    let mut prefixes_checked = 0usize;
    if prefix_step > 0 {
        let mut end = prefix_step;
        while end < candles.len() {
            for swing in detect_swings(&candles[..end], config)? {
                if !swings.contains(&swing) {
                    violations.push(format!(
                        "SWING unstable at #{}: prefix of {} candles disagrees",
                        swing.candle_index, end
                    ));
                }
            }
            prefixes_checked += 1;
            end += prefix_step;
        }
    }

    Ok(AuditReport {
        candles: candles.len(),
        swings: swings.len(),
        events: events.len(),
        prefixes_checked,
        violations,
    })
}

fn extremum_violation(
    candles: &[Candle],
    swing: &Swing,
    config: &DetectionConfig,
    lookback: usize,
) -> Option<String> {
    let index = swing.candle_index;
    if index < lookback || index + lookback >= candles.len() {
        return Some(format!("SWING at #{index} lies inside the edge window"));
    }

    let kind = match swing.kind {
        SwingKind::SwingHigh => PivotKind::High,
        SwingKind::SwingLow => PivotKind::Low,
    };
    let center = candles[index].pivot_price(kind, config.mode);
    if center != swing.price {
        return Some(format!(
            "SWING price mismatch at #{index}: got {}, candle gives {center}",
            swing.price
        ));
    }

    let neighbours = (index - lookback..index).chain(index + 1..=index + lookback);
    for j in neighbours {
        let other = candles[j].pivot_price(kind, config.mode);
        let strict = match kind {
            PivotKind::High => center > other,
            PivotKind::Low => center < other,
        };
        if !strict {
            return Some(format!(
                "SWING not a strict extreme at #{index}: neighbour #{j} has {other}"
            ));
        }
    }
    None
}

fn expected_label(swing: &Swing, previous: Option<f64>) -> StructureLabel {
    match (swing.kind, previous) {
        (SwingKind::SwingHigh, None) => StructureLabel::FirstHigh,
        (SwingKind::SwingHigh, Some(p)) if swing.price > p => StructureLabel::HigherHigh,
        (SwingKind::SwingHigh, Some(_)) => StructureLabel::LowerHigh,
        (SwingKind::SwingLow, None) => StructureLabel::FirstLow,
        (SwingKind::SwingLow, Some(p)) if swing.price > p => StructureLabel::HigherLow,
        (SwingKind::SwingLow, Some(_)) => StructureLabel::LowerLow,
    }
}
