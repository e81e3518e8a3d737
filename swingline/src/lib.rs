//! Swing-point detection and structure confirmation over OHLC candles.
//!
//! 流水线：`Candle -> Pivot -> Swing -> StructureEvent`，每一级只读取上一级输出。
//! 检测是纯函数：相同 candle 序列与配置总是产生相同结果，可在多线程间并行调用。

pub mod analysis;
pub mod breaks;
pub mod candle;
pub mod config;
pub mod constant;
pub mod engine;
pub mod frame;
pub mod loader;
pub mod logging;
pub mod pivot;
pub mod range;
pub mod retest;
pub mod swing;

pub use analysis::{
    analyze_structure, current_levels, CurrentLevels, KeyLevels, MarketTrend, StructureAnalysis,
    StructureCounts,
};
pub use breaks::{
    classify_breaks, detect_bos, detect_msb, detect_structure_breaks, latest_bos, latest_msb,
    BreakClassifier, StructureEvent, Transition, BOS, MSB,
};
pub use candle::{validate_series, Candle};
pub use config::{DetectionConfig, DetectionConfigPatch, DetectionProfileConfig};
pub use constant::{
    CandleDefect, Const, DataError, DetectionMode, DetectionType, EventKind, PatternType,
    PivotKind, StructureLabel, SwingKind, ValidationError,
};
pub use engine::{run_pattern, Detection, DetectionEngine, DetectionRun, RunContext};
pub use loader::{load_candles, load_candles_from_str, parse_datetime};
pub use logging::{init_logging, init_logging_with};
pub use pivot::{scan_pivots, Pivot};
pub use range::{
    detect_current_range, detect_ranges, FibLevels, RangeConfig, RangeStatus, TradingRange,
};
pub use retest::{find_retest, Retest, RetestConfig};
pub use swing::{
    confirm_pivots, detect_swings, fold_pivots, latest_swing_high, latest_swing_low,
    scan_structure, ConfirmState, StructureScan, Swing,
};
