//! Dataframe 导出，供研究脚本与 parquet 落地使用。

use std::fs::{create_dir_all, File};
use std::path::Path;

use polars::df;
use polars::prelude::{DataFrame, ParquetWriter, PolarsResult};

use crate::breaks::StructureEvent;
use crate::constant::{DataError, DetectionType};
use crate::swing::Swing;

pub fn swings_dataframe(swings: &[Swing]) -> PolarsResult<DataFrame> {
    let candle_index: Vec<u64> = swings.iter().map(|x| x.candle_index as u64).collect();
    let candle_time: Vec<i64> = swings.iter().map(|x| x.candle_time).collect();
    let price: Vec<f64> = swings.iter().map(|x| x.price).collect();
    let detection_type: Vec<&str> = swings
        .iter()
        .map(|x| DetectionType::from(x.kind).as_str())
        .collect();
    let structure: Vec<&str> = swings.iter().map(|x| x.structure.as_str()).collect();
    let confidence: Vec<f64> = swings.iter().map(|x| x.confidence).collect();
    let confirmed_at_index: Vec<u64> = swings
        .iter()
        .map(|x| x.confirmed_at_index as u64)
        .collect();
    let confirmed_at_time: Vec<i64> = swings.iter().map(|x| x.confirmed_at_time).collect();

    df!(
        "candle_index" => candle_index,
        "candle_time" => candle_time,
        "price" => price,
        "detection_type" => detection_type,
        "structure" => structure,
        "confidence" => confidence,
        "confirmed_at_index" => confirmed_at_index,
        "confirmed_at_time" => confirmed_at_time
    )
}

pub fn events_dataframe(events: &[StructureEvent]) -> PolarsResult<DataFrame> {
    let candle_index: Vec<u64> = events.iter().map(|x| x.candle_index as u64).collect();
    let candle_time: Vec<i64> = events.iter().map(|x| x.candle_time).collect();
    let price: Vec<f64> = events.iter().map(|x| x.price).collect();
    let detection_type: Vec<&str> = events
        .iter()
        .map(|x| DetectionType::from(x.kind).as_str())
        .collect();
    let previous: Vec<&str> = events.iter().map(|x| x.previous.as_str()).collect();
    let current: Vec<&str> = events.iter().map(|x| x.current.as_str()).collect();
    let confidence: Vec<f64> = events.iter().map(|x| x.confidence).collect();
    let reference_price: Vec<Option<f64>> = events.iter().map(|x| x.reference_price).collect();

    df!(
        "candle_index" => candle_index,
        "candle_time" => candle_time,
        "price" => price,
        "detection_type" => detection_type,
        "previous" => previous,
        "current" => current,
        "confidence" => confidence,
        "reference_price" => reference_price
    )
}

pub fn write_parquet(path: impl AsRef<Path>, frame: &mut DataFrame) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file).finish(frame)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::swings_dataframe;
    use crate::constant::{StructureLabel, SwingKind};
    use crate::swing::Swing;

    #[test]
    fn swing_frame_keeps_row_order_and_labels() {
        let swings = [
            Swing {
                candle_index: 4,
                candle_time: 240,
                price: 21.0,
                kind: SwingKind::SwingHigh,
                structure: StructureLabel::FirstHigh,
                confidence: 0.8,
                confirmed_at_index: 8,
                confirmed_at_time: 480,
            },
            Swing {
                candle_index: 8,
                candle_time: 480,
                price: 11.0,
                kind: SwingKind::SwingLow,
                structure: StructureLabel::FirstLow,
                confidence: 0.8,
                confirmed_at_index: 12,
                confirmed_at_time: 720,
            },
        ];

        let frame = swings_dataframe(&swings).expect("frame should build");
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 8);
        let structure = frame.column("structure").expect("structure column");
        assert_eq!(structure.str().expect("utf8").get(1), Some("L"));
    }
}
