use std::path::PathBuf;

use replay::{audit_swings, parse_mode_arg, take_rows};
use swingline::{init_logging_with, load_candles, DetectionConfig};
use tracing::Level;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_with(Level::WARN);

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "usage: cargo run -q -p replay --bin audit_swings -- <csv_path> [mode:wicks|closes|-] [max_rows] [prefix_step]"
        );
        std::process::exit(2);
    }

    let csv_path = PathBuf::from(&args[1]);
    let mode = parse_mode_arg(args.get(2).map(String::as_str))?.unwrap_or_default();
    let max_rows = match args.get(3) {
        Some(raw) if raw != "-" => Some(raw.parse::<usize>()?),
        _ => None,
    };
    let prefix_step = match args.get(4) {
        Some(raw) => raw.parse::<usize>()?,
        None => 50,
    };

    let candles = take_rows(load_candles(&csv_path)?, max_rows);
    let report = audit_swings(&candles, &DetectionConfig::with_mode(mode), prefix_step)?;

    println!(
        "AUDIT summary: candles={} mode={} swings={} events={} prefixes={}",
        report.candles,
        mode.as_str(),
        report.swings,
        report.events,
        report.prefixes_checked,
    );

    if report.passed() {
        println!("AUDIT result: PASS (no swing violations found)");
    } else {
        println!("AUDIT result: FAIL violations={}", report.violations.len());
        for item in report.violations.iter().take(30) {
            println!("- {item}");
        }
        if report.violations.len() > 30 {
            println!("- ... {} more", report.violations.len() - 30);
        }
        std::process::exit(1);
    }

    Ok(())
}
