use swingline::{
    detect_swings, latest_swing_high, latest_swing_low, scan_pivots, scan_structure, Candle,
    DetectionConfig, DetectionMode, PivotKind, StructureLabel, SwingKind,
};

const BASE_TIME: i64 = 1_700_000_000;
const STEP: i64 = 3_600;

/// Piecewise-linear close path through `(index, value)` turning points; each
/// candle spans close ± 1 with open == close.
fn path_candles(turns: &[(usize, f64)]) -> Vec<Candle> {
    let mut closes = vec![turns[0].1];
    for leg in turns.windows(2) {
        let (i0, v0) = leg[0];
        let (i1, v1) = leg[1];
        let steps = (i1 - i0) as f64;
        for k in 1..=(i1 - i0) {
            closes.push(v0 + (v1 - v0) * k as f64 / steps);
        }
    }

    closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            Candle::new(BASE_TIME + i as i64 * STEP, close, close + 1.0, close - 1.0, close)
        })
        .collect()
}

fn zigzag() -> Vec<Candle> {
    path_candles(&[
        (0, 10.0),
        (4, 20.0),
        (8, 12.0),
        (12, 24.0),
        (16, 16.0),
        (20, 28.0),
        (24, 18.0),
        (28, 26.0),
        (32, 10.0),
        (36, 22.0),
        (40, 14.0),
        (44, 20.0),
    ])
}

fn noisy_candles(count: usize, seed: u64) -> Vec<Candle> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as f64) / ((1_u64 << 31) as f64)
    };

    let mut price = 100.0_f64;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let open = price;
        let close = (open + (next() - 0.5) * 4.0).max(1.0);
        let high = open.max(close) + next() * 1.5;
        let low = open.min(close) - next() * 1.5;
        price = close;
        out.push(Candle::new(BASE_TIME + i as i64 * STEP, open, high, low, close));
    }
    out
}

fn wicks() -> DetectionConfig {
    DetectionConfig::with_mode(DetectionMode::Wicks)
}

fn closes() -> DetectionConfig {
    DetectionConfig::with_mode(DetectionMode::Closes)
}

#[test]
fn empty_and_short_series_return_no_swings() {
    assert!(detect_swings(&[], &wicks()).expect("empty is valid").is_empty());

    let short = zigzag().into_iter().take(6).collect::<Vec<_>>();
    assert!(detect_swings(&short, &wicks()).expect("valid").is_empty());
    assert!(detect_swings(&short, &closes()).expect("valid").is_empty());
    assert!(scan_pivots(&short, DetectionMode::Wicks, 3).is_empty());
}

#[test]
fn flat_run_produces_no_pivots() {
    let candles = (0..15)
        .map(|i| Candle::new(BASE_TIME + i * STEP, 10.0, 10.5, 9.5, 10.0))
        .collect::<Vec<_>>();

    assert!(scan_pivots(&candles, DetectionMode::Wicks, 3).is_empty());
    assert!(scan_pivots(&candles, DetectionMode::Closes, 3).is_empty());
    assert!(detect_swings(&candles, &wicks()).expect("valid").is_empty());
}

#[test]
fn rise_fall_rise_confirms_the_peak_once_a_low_follows() {
    let candles = path_candles(&[(0, 10.0), (10, 20.0), (15, 15.0), (20, 20.0)]);
    assert_eq!(candles.len(), 21);

    let pivots = scan_pivots(&candles, DetectionMode::Wicks, 3);
    let summary = pivots
        .iter()
        .map(|x| (x.index, x.kind, x.price))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![(10, PivotKind::High, 21.0), (15, PivotKind::Low, 14.0)]
    );

    let scan = scan_structure(&candles, &wicks()).expect("valid");
    assert_eq!(scan.swings.len(), 1);
    let peak = scan.swings[0];
    assert_eq!(peak.candle_index, 10);
    assert_eq!(peak.candle_time, BASE_TIME + 10 * STEP);
    assert_eq!(peak.price, 21.0);
    assert_eq!(peak.kind, SwingKind::SwingHigh);
    assert_eq!(peak.structure, StructureLabel::FirstHigh);
    assert_eq!(peak.confidence, 0.8);
    assert_eq!(peak.confirmed_at_index, 15);

    // the trough has nothing after it to break the confirmed high yet
    assert_eq!(scan.pending_low.map(|x| x.index), Some(15));
    assert_eq!(scan.pending_high, None);
}

#[test]
fn zigzag_swings_match_hand_computed_structure() {
    let swings = detect_swings(&zigzag(), &wicks()).expect("valid");
    let summary = swings
        .iter()
        .map(|x| (x.candle_index, x.kind, x.structure, x.price, x.confirmed_at_index))
        .collect::<Vec<_>>();

    assert_eq!(
        summary,
        vec![
            (4, SwingKind::SwingHigh, StructureLabel::FirstHigh, 21.0, 8),
            (8, SwingKind::SwingLow, StructureLabel::FirstLow, 11.0, 12),
            (16, SwingKind::SwingLow, StructureLabel::HigherLow, 15.0, 20),
            (20, SwingKind::SwingHigh, StructureLabel::HigherHigh, 29.0, 32),
            (24, SwingKind::SwingLow, StructureLabel::HigherLow, 17.0, 28),
            (36, SwingKind::SwingHigh, StructureLabel::LowerHigh, 23.0, 40),
        ]
    );
}

#[test]
fn latest_swings_are_the_last_of_each_kind() {
    let swings = detect_swings(&zigzag(), &wicks()).expect("valid");

    let high = latest_swing_high(&swings).expect("zigzag has highs");
    assert_eq!((high.candle_index, high.price), (36, 23.0));
    let low = latest_swing_low(&swings).expect("zigzag has lows");
    assert_eq!((low.candle_index, low.price), (24, 17.0));

    assert!(latest_swing_high(&swings[1..3]).is_none());
    assert!(latest_swing_low(&[]).is_none());
}

#[test]
fn zigzag_leaves_unbroken_low_pending() {
    let scan = scan_structure(&zigzag(), &wicks()).expect("valid");
    assert_eq!(scan.pending_high, None);
    let pending = scan.pending_low.expect("low at 32 is never broken");
    assert_eq!(pending.index, 32);
    assert_eq!(pending.price, 9.0);
    assert!(scan.swings.iter().all(|x| x.candle_index != 32));
}

#[test]
fn closes_mode_uses_close_prices_with_same_structure() {
    let by_wicks = detect_swings(&zigzag(), &wicks()).expect("valid");
    let by_closes = detect_swings(&zigzag(), &closes()).expect("valid");

    assert_eq!(by_wicks.len(), by_closes.len());
    for (w, c) in by_wicks.iter().zip(&by_closes) {
        assert_eq!(w.candle_index, c.candle_index);
        assert_eq!(w.structure, c.structure);
        let expected = match c.kind {
            SwingKind::SwingHigh => w.price - 1.0,
            SwingKind::SwingLow => w.price + 1.0,
        };
        assert_eq!(c.price, expected);
    }
}

#[test]
fn first_of_kind_labels_hold_in_both_modes() {
    for config in [wicks(), closes()] {
        for candles in [zigzag(), noisy_candles(400, 7)] {
            let swings = detect_swings(&candles, &config).expect("valid");
            if let Some(first_high) = swings.iter().find(|x| x.is_high()) {
                assert_eq!(first_high.structure, StructureLabel::FirstHigh);
            }
            if let Some(first_low) = swings.iter().find(|x| x.is_low()) {
                assert_eq!(first_low.structure, StructureLabel::FirstLow);
            }
            assert!(swings
                .iter()
                .skip_while(|x| !x.is_high())
                .skip(1)
                .filter(|x| x.is_high())
                .all(|x| x.structure != StructureLabel::FirstHigh));
        }
    }
}

#[test]
fn outside_bar_is_both_high_and_low_pivot() {
    let mut candles = (0..11)
        .map(|i| Candle::new(BASE_TIME + i * STEP, 7.0, 10.0, 5.0, 7.0))
        .collect::<Vec<_>>();
    candles[3].high = 20.0;
    candles[3].low = 0.0;

    let pivots = scan_pivots(&candles[..7], DetectionMode::Wicks, 3);
    assert_eq!(
        pivots.iter().map(|x| (x.index, x.kind)).collect::<Vec<_>>(),
        vec![(3, PivotKind::High), (3, PivotKind::Low)]
    );

    // high is processed first, so the same candle's low confirms it
    let swings = detect_swings(&candles[..7], &wicks()).expect("valid");
    assert_eq!(swings.len(), 1);
    assert_eq!(swings[0].structure, StructureLabel::FirstHigh);
    assert_eq!(swings[0].confirmed_at_index, 3);

    candles[7].high = 25.0;
    let swings = detect_swings(&candles, &wicks()).expect("valid");
    assert_eq!(
        swings
            .iter()
            .map(|x| (x.candle_index, x.structure, x.confirmed_at_index))
            .collect::<Vec<_>>(),
        vec![
            (3, StructureLabel::FirstHigh, 3),
            (3, StructureLabel::FirstLow, 7),
        ]
    );

    // a single close can never be both strictly highest and lowest
    assert!(detect_swings(&candles[..7], &closes()).expect("valid").is_empty());
}

#[test]
fn output_is_chronological() {
    for seed in [1_u64, 42, 1234] {
        let swings = detect_swings(&noisy_candles(500, seed), &wicks()).expect("valid");
        assert!(swings.len() > 4, "fixture should produce several swings");
        for pair in swings.windows(2) {
            assert!(pair[0].candle_time <= pair[1].candle_time);
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    let candles = noisy_candles(300, 99);
    for config in [wicks(), closes()] {
        let a = detect_swings(&candles, &config).expect("valid");
        let b = detect_swings(&candles, &config).expect("valid");
        assert_eq!(a, b);
    }
}

#[test]
fn swings_are_strict_extremes_of_their_window() {
    let candles = noisy_candles(400, 17);
    for config in [wicks(), closes()] {
        for swing in detect_swings(&candles, &config).expect("valid") {
            let kind = if swing.is_high() {
                PivotKind::High
            } else {
                PivotKind::Low
            };
            let i = swing.candle_index;
            assert_eq!(swing.price, candles[i].pivot_price(kind, config.mode));
            for j in (i - 3..i).chain(i + 1..=i + 3) {
                let other = candles[j].pivot_price(kind, config.mode);
                match kind {
                    PivotKind::High => assert!(swing.price > other),
                    PivotKind::Low => assert!(swing.price < other),
                }
            }
        }
    }
}

#[test]
fn appending_candles_never_relabels_confirmed_swings() {
    let candles = noisy_candles(400, 5);
    let full = detect_swings(&candles, &wicks()).expect("valid");

    for k in [20, 57, 120, 233, 399] {
        let prefix = detect_swings(&candles[..k], &wicks()).expect("valid");
        for swing in &prefix {
            assert!(swing.candle_index < k - 3);
            assert!(
                full.contains(swing),
                "swing at {} changed after appending candles",
                swing.candle_index
            );
        }
    }
}

#[test]
fn malformed_candle_is_rejected() {
    let mut candles = zigzag();
    candles[9].close = f64::INFINITY;
    assert!(matches!(
        detect_swings(&candles, &wicks()),
        Err(swingline::ValidationError::InvalidCandle { index: 9, .. })
    ));
}
