//! Replay helpers shared by the CLI bins: build chart payloads, flatten
//! detections for CSV and audit a candle file against the swing invariants.

pub mod audit;
pub mod payload;

pub use audit::{audit_swings, AuditReport};
pub use payload::{build_payload, write_detections_csv, DetectionRow, ExportPayload};

use swingline::{Candle, DataError, DetectionMode};

/// Optional positional mode argument; absent or `-` means "use the default".
pub fn parse_mode_arg(raw: Option<&str>) -> Result<Option<DetectionMode>, DataError> {
    match raw.map(str::trim) {
        None | Some("") | Some("-") => Ok(None),
        Some(value) => DetectionMode::parse(value).map(Some),
    }
}

pub fn take_rows(mut candles: Vec<Candle>, max_rows: Option<usize>) -> Vec<Candle> {
    if let Some(max_rows) = max_rows {
        candles.truncate(max_rows);
    }
    candles
}
