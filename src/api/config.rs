use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::bounds::RescalePolicy;
use crate::core::reconcile::DEFAULT_RING_SPACING;
use crate::error::{DefError, DefResult};
use crate::fit::{FitOptions, MAX_POLYNOMIAL_DEGREE};
use crate::interaction::EditTuning;

pub const EDITOR_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Parameters shown after a load when present in the document.
pub const DEFAULT_WORKING_SET: [&str; 6] = ["VROT", "SBR", "INCL", "PA", "SDIS", "XPOS"];

/// Session bootstrap configuration.
///
/// Serializable so hosts can persist editor tuning next to their own
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub edit: EditTuning,
    #[serde(default = "default_ring_spacing")]
    pub ring_spacing: f64,
    /// Fraction of the data span added around freshly loaded data.
    #[serde(default = "default_view_margin")]
    pub view_margin: f64,
    #[serde(default = "default_working_set")]
    pub default_working_set: Vec<String>,
    #[serde(default)]
    pub fit: FitOptions,
    #[serde(default = "default_snapshot_poll_interval_ms")]
    pub snapshot_poll_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            edit: EditTuning::default(),
            ring_spacing: default_ring_spacing(),
            view_margin: default_view_margin(),
            default_working_set: default_working_set(),
            fit: FitOptions::default(),
            snapshot_poll_interval_ms: default_snapshot_poll_interval_ms(),
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn with_hit_radius(mut self, hit_radius: f64) -> Self {
        self.edit.hit_radius = hit_radius;
        self
    }

    #[must_use]
    pub fn with_overshoot(mut self, overshoot: f64) -> Self {
        self.edit.overshoot = overshoot;
        self
    }

    #[must_use]
    pub fn with_rescale_policy(mut self, policy: RescalePolicy) -> Self {
        self.edit.rescale = policy;
        self
    }

    #[must_use]
    pub fn with_ring_spacing(mut self, spacing: f64) -> Self {
        self.ring_spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_view_margin(mut self, margin: f64) -> Self {
        self.view_margin = margin;
        self
    }

    /// Replaces the parameters shown after a load.
    #[must_use]
    pub fn with_default_working_set<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.default_working_set = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_uppercase())
            .collect();
        self
    }

    #[must_use]
    pub fn with_fit_options(mut self, options: FitOptions) -> Self {
        self.fit = options;
        self
    }

    #[must_use]
    pub fn with_snapshot_poll_interval(mut self, interval: Duration) -> Self {
        self.snapshot_poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn snapshot_poll_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_poll_interval_ms)
    }

    pub fn validate(&self) -> DefResult<()> {
        self.edit.validate()?;
        if !self.ring_spacing.is_finite() || self.ring_spacing <= 0.0 {
            return Err(DefError::InvalidData(
                "ring spacing must be finite and > 0".to_owned(),
            ));
        }
        if !self.view_margin.is_finite() || self.view_margin < 0.0 {
            return Err(DefError::InvalidData(
                "view margin must be finite and >= 0".to_owned(),
            ));
        }
        let (min, max) = self.fit.degree_range;
        if min < 1 || max > MAX_POLYNOMIAL_DEGREE || min > max {
            return Err(DefError::InvalidData(format!(
                "default fit degree range must lie within 1..={MAX_POLYNOMIAL_DEGREE}"
            )));
        }
        if self.default_working_set.iter().any(|name| name.trim().is_empty()) {
            return Err(DefError::InvalidData(
                "default working set contains an empty name".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_contract_v1_pretty(&self) -> DefResult<String> {
        let payload = EditorConfigJsonContractV1 {
            schema_version: EDITOR_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DefError::InvalidData(format!("failed to serialize editor config contract v1: {e}"))
        })
    }

    /// Accepts either a bare config object or a versioned contract.
    pub fn from_json_compat_str(input: &str) -> DefResult<Self> {
        let config = match serde_json::from_str::<EditorConfigJsonContractV1>(input) {
            Ok(payload) => {
                if payload.schema_version != EDITOR_CONFIG_JSON_SCHEMA_V1 {
                    return Err(DefError::InvalidData(format!(
                        "unsupported editor config schema version: {}",
                        payload.schema_version
                    )));
                }
                payload.config
            }
            Err(_) => serde_json::from_str::<Self>(input).map_err(|e| {
                DefError::InvalidData(format!("failed to parse editor config json: {e}"))
            })?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_path(path: impl AsRef<Path>) -> DefResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DefError::io(path, source))?;
        Self::from_json_compat_str(&text)
    }

    pub fn save_path(&self, path: impl AsRef<Path>) -> DefResult<()> {
        let path = path.as_ref();
        let text = self.to_json_contract_v1_pretty()?;
        std::fs::write(path, text).map_err(|source| DefError::io(path, source))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: EditorConfig,
}

fn default_ring_spacing() -> f64 {
    DEFAULT_RING_SPACING
}

fn default_view_margin() -> f64 {
    0.1
}

fn default_working_set() -> Vec<String> {
    DEFAULT_WORKING_SET.iter().map(|name| (*name).to_owned()).collect()
}

fn default_snapshot_poll_interval_ms() -> u64 {
    1_000
}
