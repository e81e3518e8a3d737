use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use swingline::{
    analyze_structure, classify_breaks, detect_ranges, find_retest, scan_structure, Candle,
    Detection, DetectionConfig, DetectionMode, DetectionType, KeyLevels, MarketTrend, Pivot,
    PivotKind, RangeConfig, RetestConfig, TradingRange, ValidationError,
};

#[derive(Debug, Serialize)]
pub struct ExportPayload {
    pub series: String,
    pub mode: DetectionMode,
    pub lookback: usize,
    pub generated_at: DateTime<Utc>,
    pub candles: Vec<CandlePoint>,
    pub swings: Vec<SwingMarker>,
    pub events: Vec<EventMarker>,
    pub pending: Vec<PendingMarker>,
    pub trend: MarketTrend,
    pub key_levels: KeyLevels,
    pub ranges: Vec<TradingRange>,
}

#[derive(Debug, Serialize)]
pub struct CandlePoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Serialize)]
pub struct SwingMarker {
    pub index: usize,
    pub time: i64,
    pub price: f64,
    pub kind: &'static str,
    pub structure: &'static str,
    pub confirmed_at: i64,
}

#[derive(Debug, Serialize)]
pub struct EventMarker {
    pub index: usize,
    pub time: i64,
    pub price: f64,
    pub kind: &'static str,
    pub previous: &'static str,
    pub current: &'static str,
    pub reference_price: Option<f64>,
    pub retest_time: Option<i64>,
}

/// Candidate still waiting for a break when the file ended.
#[derive(Debug, Serialize)]
pub struct PendingMarker {
    pub index: usize,
    pub time: i64,
    pub price: f64,
    pub kind: &'static str,
}

pub fn build_payload(
    series: &str,
    candles: &[Candle],
    config: &DetectionConfig,
    retest: &RetestConfig,
) -> Result<ExportPayload, ValidationError> {
    let scan = scan_structure(candles, config)?;
    let events = classify_breaks(&scan.swings);
    let analysis = analyze_structure(&scan.swings);
    let ranges = detect_ranges(candles, &scan.swings, &RangeConfig::default());

    let swings = scan
        .swings
        .iter()
        .map(|swing| SwingMarker {
            index: swing.candle_index,
            time: swing.candle_time,
            price: swing.price,
            kind: DetectionType::from(swing.kind).as_str(),
            structure: swing.structure.as_str(),
            confirmed_at: swing.confirmed_at_time,
        })
        .collect();

    let events = events
        .iter()
        .map(|event| EventMarker {
            index: event.candle_index,
            time: event.candle_time,
            price: event.price,
            kind: DetectionType::from(event.kind).as_str(),
            previous: event.previous.as_str(),
            current: event.current.as_str(),
            reference_price: event.reference_price,
            retest_time: find_retest(candles, event, retest).map(|x| x.candle_time),
        })
        .collect();

    let pending = [scan.pending_high, scan.pending_low]
        .into_iter()
        .flatten()
        .map(pending_marker)
        .collect();

    Ok(ExportPayload {
        series: series.to_string(),
        mode: config.mode,
        lookback: config.lookback,
        generated_at: Utc::now(),
        candles: candles
            .iter()
            .map(|x| CandlePoint {
                time: x.time,
                open: x.open,
                high: x.high,
                low: x.low,
                close: x.close,
            })
            .collect(),
        swings,
        events,
        pending,
        trend: analysis.trend,
        key_levels: analysis.key_levels,
        ranges,
    })
}

fn pending_marker(pivot: Pivot) -> PendingMarker {
    PendingMarker {
        index: pivot.index,
        time: pivot.time,
        price: pivot.price,
        kind: match pivot.kind {
            PivotKind::High => "high",
            PivotKind::Low => "low",
        },
    }
}

/// Flat CSV row; `structure` is empty for BOS/MSB detections.
#[derive(Debug, Serialize)]
pub struct DetectionRow<'a> {
    pub series: &'a str,
    pub candle_index: usize,
    pub candle_time: i64,
    pub datetime: String,
    pub price: f64,
    pub detection_type: &'static str,
    pub structure: &'static str,
    pub confidence: f64,
    pub mode: &'static str,
}

impl<'a> DetectionRow<'a> {
    pub fn new(series: &'a str, detection: &Detection) -> Self {
        Self {
            series,
            candle_index: detection.candle_index,
            candle_time: detection.candle_time,
            datetime: DateTime::from_timestamp(detection.candle_time, 0)
                .map(|x| x.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
            price: detection.price,
            detection_type: detection.detection_type.as_str(),
            structure: detection.structure.map(|x| x.as_str()).unwrap_or_default(),
            confidence: detection.confidence,
            mode: detection.mode.as_str(),
        }
    }
}

pub fn write_detections_csv<W: Write>(
    writer: W,
    series: &str,
    detections: &[Detection],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for detection in detections {
        writer.serialize(DetectionRow::new(series, detection))?;
    }
    writer.flush()?;
    Ok(())
}
