use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    #[default]
    Wicks,
    Closes,
}

impl DetectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wicks => "wicks",
            Self::Closes => "closes",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DataError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wicks" | "wick" => Ok(Self::Wicks),
            "closes" | "close" => Ok(Self::Closes),
            _ => Err(DataError::InvalidMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    SwingHigh,
    SwingLow,
}

impl From<PivotKind> for SwingKind {
    fn from(value: PivotKind) -> Self {
        match value {
            PivotKind::High => Self::SwingHigh,
            PivotKind::Low => Self::SwingLow,
        }
    }
}

/// Label of a confirmed swing relative to the previous confirmed swing of the
/// same kind. `FirstHigh` / `FirstLow` mark the first of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureLabel {
    #[serde(rename = "HH")]
    HigherHigh,
    #[serde(rename = "LH")]
    LowerHigh,
    #[serde(rename = "HL")]
    HigherLow,
    #[serde(rename = "LL")]
    LowerLow,
    #[serde(rename = "H")]
    FirstHigh,
    #[serde(rename = "L")]
    FirstLow,
}

impl StructureLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HigherHigh => "HH",
            Self::LowerHigh => "LH",
            Self::HigherLow => "HL",
            Self::LowerLow => "LL",
            Self::FirstHigh => "H",
            Self::FirstLow => "L",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BosBullish,
    BosBearish,
    MsbBullish,
    MsbBearish,
}

impl EventKind {
    pub fn is_bullish(self) -> bool {
        matches!(self, Self::BosBullish | Self::MsbBullish)
    }

    pub fn is_bos(self) -> bool {
        matches!(self, Self::BosBullish | Self::BosBearish)
    }
}

/// Wire name of everything the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionType {
    SwingHigh,
    SwingLow,
    BosBullish,
    BosBearish,
    MsbBullish,
    MsbBearish,
}

impl DetectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SwingHigh => "swing_high",
            Self::SwingLow => "swing_low",
            Self::BosBullish => "bos_bullish",
            Self::BosBearish => "bos_bearish",
            Self::MsbBullish => "msb_bullish",
            Self::MsbBearish => "msb_bearish",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "swing_high" => Some(Self::SwingHigh),
            "swing_low" => Some(Self::SwingLow),
            "bos_bullish" => Some(Self::BosBullish),
            "bos_bearish" => Some(Self::BosBearish),
            "msb_bullish" => Some(Self::MsbBullish),
            "msb_bearish" => Some(Self::MsbBearish),
            _ => None,
        }
    }
}

impl From<SwingKind> for DetectionType {
    fn from(value: SwingKind) -> Self {
        match value {
            SwingKind::SwingHigh => Self::SwingHigh,
            SwingKind::SwingLow => Self::SwingLow,
        }
    }
}

impl From<EventKind> for DetectionType {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::BosBullish => Self::BosBullish,
            EventKind::BosBearish => Self::BosBearish,
            EventKind::MsbBullish => Self::MsbBullish,
            EventKind::MsbBearish => Self::MsbBearish,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Swings,
    Bos,
    Msb,
}

impl PatternType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Swings => "swings",
            Self::Bos => "bos",
            Self::Msb => "msb",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "swings" | "swing" => Some(Self::Swings),
            "bos" => Some(Self::Bos),
            "msb" => Some(Self::Msb),
            _ => None,
        }
    }
}

pub struct Const;

impl Const {
    pub const LOOKBACK: usize = 3;
    pub const SWING_CONFIDENCE: f64 = 0.8;
    pub const BOS_CONFIDENCE: f64 = 0.7;
    pub const MSB_CONFIDENCE: f64 = 0.75;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleDefect {
    NonFinitePrice,
    HighBelowLow,
    OpenOutOfRange,
    CloseOutOfRange,
}

impl Display for CandleDefect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinitePrice => write!(f, "non-finite price"),
            Self::HighBelowLow => write!(f, "high below low"),
            Self::OpenOutOfRange => write!(f, "open outside high/low range"),
            Self::CloseOutOfRange => write!(f, "close outside high/low range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidCandle {
        index: usize,
        time: i64,
        defect: CandleDefect,
    },
    UnorderedTime {
        index: usize,
        previous: i64,
        time: i64,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCandle {
                index,
                time,
                defect,
            } => write!(f, "invalid candle #{index} at {time}: {defect}"),
            Self::UnorderedTime {
                index,
                previous,
                time,
            } => write!(
                f,
                "candle #{index} time {time} does not follow previous time {previous}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum DataError {
    InvalidDatetime(String),
    InvalidMode(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Polars(polars::error::PolarsError),
    Validation(ValidationError),
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDatetime(v) => write!(f, "invalid datetime: {v}"),
            Self::InvalidMode(v) => write!(f, "invalid detection mode: {v}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Polars(e) => write!(f, "polars error: {e}"),
            Self::Validation(e) => write!(f, "validation error: {e}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for DataError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<polars::error::PolarsError> for DataError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::Polars(value)
    }
}

impl From<ValidationError> for DataError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
