use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constant::{Const, DetectionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub mode: DetectionMode,
    pub lookback: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Wicks,
            lookback: Const::LOOKBACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DetectionConfigPatch {
    pub mode: Option<DetectionMode>,
    pub lookback: Option<usize>,
}

impl DetectionConfig {
    pub fn with_mode(mode: DetectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn apply_patch(mut self, patch: DetectionConfigPatch) -> Self {
        if let Some(v) = patch.mode {
            self.mode = v;
        }
        if let Some(v) = patch.lookback {
            self.lookback = v.max(1);
        }
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let patch: DetectionConfigPatch = serde_yaml::from_str(yaml)?;
        Ok(Self::default().apply_patch(patch))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&raw)?;
        Ok(config)
    }
}

/// Stored detection preferences. Resolution order, weakest first: built-in
/// default, `default`, `user`, `series`, then the per-run override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionProfileConfig {
    #[serde(default)]
    pub default: DetectionConfigPatch,
    #[serde(default)]
    pub user: HashMap<String, DetectionConfigPatch>,
    #[serde(default)]
    pub series: HashMap<String, DetectionConfigPatch>,
}

impl DetectionProfileConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let profile = match path.extension().and_then(|x| x.to_str()) {
            Some("json") => Self::from_json_str(&raw)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            _ => return Err("unsupported detection profile format".into()),
        };
        Ok(profile)
    }

    pub fn set_user_mode(&mut self, user_id: &str, mode: DetectionMode) {
        self.user.entry(normalize_key(user_id)).or_default().mode = Some(mode);
    }

    pub fn set_series_mode(&mut self, series_id: &str, mode: DetectionMode) {
        self.series.entry(normalize_key(series_id)).or_default().mode = Some(mode);
    }

    pub fn resolve_for(
        &self,
        user_id: Option<&str>,
        series_id: Option<&str>,
        run_override: Option<DetectionMode>,
    ) -> DetectionConfig {
        let mut config = DetectionConfig::default().apply_patch(self.default);

        if let Some(patch) = user_id.and_then(|x| find_patch(&self.user, x)) {
            config = config.apply_patch(*patch);
        }
        if let Some(patch) = series_id.and_then(|x| find_patch(&self.series, x)) {
            config = config.apply_patch(*patch);
        }
        if let Some(mode) = run_override {
            config.mode = mode;
        }
        config
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn find_patch<'a>(
    map: &'a HashMap<String, DetectionConfigPatch>,
    key: &str,
) -> Option<&'a DetectionConfigPatch> {
    let key = normalize_key(key);
    map.get(&key)
        .or_else(|| map.iter().find(|(k, _)| normalize_key(k) == key).map(|(_, v)| v))
}
