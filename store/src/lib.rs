//! `store` crate 入口。
//!
//! 职责：按 (series, pattern) 保存最近一次检测结果，重跑时整体替换旧记录。
//! 写入纪律由调用方掌握：同一 series 的并发写需要调用方自行串行化。
//!
//! 快速示例：
//! ```rust,no_run
//! use store::DetectionStore;
//! use swingline::{run_pattern, DetectionConfig, PatternType};
//!
//! let candles = swingline::load_candles("BTCUSDT-1h.csv").expect("candles");
//! let run = run_pattern(PatternType::Swings, &candles, &DetectionConfig::default()).expect("valid");
//!
//! let store = DetectionStore::open("data/detections").expect("store");
//! store.replace("BTCUSDT-1h", &run).expect("write");
//! let restored = store.load("BTCUSDT-1h", PatternType::Swings).expect("read");
//! assert_eq!(restored.map(|x| x.detections.len()), Some(run.detections.len()));
//! ```

mod storage;

pub use storage::{DetectionStore, RunHeader, StoredRun};
