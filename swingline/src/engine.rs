use serde::{Deserialize, Serialize};
use tracing::info;

use crate::breaks::{StructureEvent, BOS, MSB};
use crate::candle::Candle;
use crate::config::{DetectionConfig, DetectionProfileConfig};
use crate::constant::{DetectionMode, DetectionType, PatternType, StructureLabel, ValidationError};
use crate::swing::{detect_swings, Swing};

/// Flat record handed to persistence, tagged with the mode that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub candle_index: usize,
    pub candle_time: i64,
    pub price: f64,
    pub detection_type: DetectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureLabel>,
    pub confidence: f64,
    pub mode: DetectionMode,
}

impl Detection {
    pub fn from_swing(swing: &Swing, mode: DetectionMode) -> Self {
        Self {
            candle_index: swing.candle_index,
            candle_time: swing.candle_time,
            price: swing.price,
            detection_type: swing.kind.into(),
            structure: Some(swing.structure),
            confidence: swing.confidence,
            mode,
        }
    }

    pub fn from_event(event: &StructureEvent, mode: DetectionMode) -> Self {
        Self {
            candle_index: event.candle_index,
            candle_time: event.candle_time,
            price: event.price,
            detection_type: event.kind.into(),
            structure: None,
            confidence: event.confidence,
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRun {
    pub pattern: PatternType,
    pub mode: DetectionMode,
    pub detections: Vec<Detection>,
}

/// Who is asking for a run; used only to pick the detection mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunContext<'a> {
    pub user_id: Option<&'a str>,
    pub series_id: Option<&'a str>,
    pub mode_override: Option<DetectionMode>,
}

#[derive(Debug, Clone, Default)]
pub struct DetectionEngine {
    profile: DetectionProfileConfig,
}

impl DetectionEngine {
    pub fn new(profile: DetectionProfileConfig) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &DetectionProfileConfig {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut DetectionProfileConfig {
        &mut self.profile
    }

    pub fn resolve(&self, ctx: &RunContext<'_>) -> DetectionConfig {
        self.profile
            .resolve_for(ctx.user_id, ctx.series_id, ctx.mode_override)
    }

    pub fn run(
        &self,
        pattern: PatternType,
        candles: &[Candle],
        ctx: &RunContext<'_>,
    ) -> Result<DetectionRun, ValidationError> {
        let config = self.resolve(ctx);
        let run = run_pattern(pattern, candles, &config)?;
        info!(
            series = ctx.series_id.unwrap_or("-"),
            pattern = pattern.as_str(),
            mode = config.mode.as_str(),
            detections = run.detections.len(),
            "detection run finished"
        );
        Ok(run)
    }
}

pub fn run_pattern(
    pattern: PatternType,
    candles: &[Candle],
    config: &DetectionConfig,
) -> Result<DetectionRun, ValidationError> {
    let swings = detect_swings(candles, config)?;
    let detections = match pattern {
        PatternType::Swings => swings
            .iter()
            .map(|x| Detection::from_swing(x, config.mode))
            .collect(),
        PatternType::Bos => BOS
            .classify(&swings)
            .iter()
            .map(|x| Detection::from_event(x, config.mode))
            .collect(),
        PatternType::Msb => MSB
            .classify(&swings)
            .iter()
            .map(|x| Detection::from_event(x, config.mode))
            .collect(),
    };

    Ok(DetectionRun {
        pattern,
        mode: config.mode,
        detections,
    })
}
