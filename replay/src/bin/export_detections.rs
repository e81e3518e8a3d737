use std::fs;
use std::path::PathBuf;

use replay::{build_payload, parse_mode_arg, take_rows};
use swingline::frame::{events_dataframe, swings_dataframe, write_parquet};
use swingline::{
    classify_breaks, detect_swings, init_logging, load_candles, DetectionConfig, RetestConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "usage: cargo run -p replay --bin export_detections -- <csv_path> <series_id> [mode:wicks|closes|-] [output_json] [max_rows] [parquet_dir]"
        );
        std::process::exit(2);
    }

    let csv_path = PathBuf::from(&args[1]);
    let series = args[2].clone();
    let mode = parse_mode_arg(args.get(3).map(String::as_str))?.unwrap_or_default();
    let output = match args.get(4) {
        Some(path) if path != "-" => PathBuf::from(path),
        _ => PathBuf::from(format!("replay/out/detections-{}-{}.json", series, mode.as_str())),
    };
    let max_rows = match args.get(5) {
        Some(raw) if raw != "-" => Some(raw.parse::<usize>()?),
        _ => None,
    };
    let parquet_dir = args.get(6).map(PathBuf::from);

    let candles = take_rows(load_candles(&csv_path)?, max_rows);
    let config = DetectionConfig::with_mode(mode);
    let payload = build_payload(&series, &candles, &config, &RetestConfig::default())?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, serde_json::to_vec_pretty(&payload)?)?;

    if let Some(dir) = parquet_dir {
        let swings = detect_swings(&candles, &config)?;
        let events = classify_breaks(&swings);
        write_parquet(dir.join("swings.parquet"), &mut swings_dataframe(&swings)?)?;
        write_parquet(dir.join("events.parquet"), &mut events_dataframe(&events)?)?;
        println!("parquet written to {}", dir.display());
    }

    println!(
        "exported {} candles to {} (mode={}, swings={}, events={}, pending={}, trend={:?})",
        payload.candles.len(),
        output.display(),
        mode.as_str(),
        payload.swings.len(),
        payload.events.len(),
        payload.pending.len(),
        payload.trend,
    );

    Ok(())
}
