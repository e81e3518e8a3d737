use std::fs::{self, File};
use std::path::PathBuf;

use replay::{parse_mode_arg, write_detections_csv};
use store::DetectionStore;
use swingline::{
    init_logging, load_candles, DetectionEngine, DetectionProfileConfig, PatternType, RunContext,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "usage: cargo run -p replay --bin persist_detections -- <csv_path> <series_id> <store_root> [profile.yaml|profile.json|-] [user_id|-] [mode:wicks|closes|-] [csv_out]"
        );
        std::process::exit(2);
    }

    let csv_path = PathBuf::from(&args[1]);
    let series = args[2].clone();
    let store = DetectionStore::open(&args[3])?;
    let profile = match args.get(4) {
        Some(path) if path != "-" => DetectionProfileConfig::from_file(path)?,
        _ => DetectionProfileConfig::default(),
    };
    let user_id = args.get(5).map(String::as_str).filter(|x| *x != "-");
    let mode_override = parse_mode_arg(args.get(6).map(String::as_str))?;
    let csv_out = args.get(7).map(PathBuf::from);

    let candles = load_candles(&csv_path)?;
    let engine = DetectionEngine::new(profile);
    let ctx = RunContext {
        user_id,
        series_id: Some(series.as_str()),
        mode_override,
    };

    let mut all = Vec::new();
    for pattern in [PatternType::Swings, PatternType::Bos, PatternType::Msb] {
        let run = engine.run(pattern, &candles, &ctx)?;
        let written = store.replace(&series, &run)?;
        println!(
            "stored {} {} detections for {} (mode={})",
            written,
            pattern.as_str(),
            series,
            run.mode.as_str()
        );
        all.extend(run.detections);
    }

    if let Some(path) = csv_out {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        all.sort_by_key(|x| (x.candle_time, x.candle_index));
        write_detections_csv(File::create(&path)?, &series, &all)?;
        println!("flat detections written to {}", path.display());
    }

    Ok(())
}
