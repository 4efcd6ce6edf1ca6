use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::bounds::ViewBounds;
use crate::core::series::{ParameterId, ParameterSeries};
use crate::def_file::DefMetadata;
use crate::error::{DefError, DefResult};
use crate::interaction::EditState;

pub const SESSION_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Serializable view of one working-set series.
///
/// Non-finite numbers are stored as `None` so the snapshot stays valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub name: ParameterId,
    pub unit: String,
    pub values: Vec<Option<f64>>,
    pub uncertainties: Vec<Option<f64>>,
    pub decimal_precision: usize,
    pub view_bounds: ViewBounds,
    pub history_depth: usize,
    pub redo_depth: usize,
    pub edit_state: EditState,
    pub fit_in_flight: bool,
}

impl SeriesSnapshot {
    pub(crate) fn capture(
        series: &ParameterSeries,
        edit_state: EditState,
        fit_in_flight: bool,
    ) -> Self {
        Self {
            name: series.id().clone(),
            unit: series.unit().to_owned(),
            values: finite_or_none(series.values()),
            uncertainties: finite_or_none(series.uncertainties()),
            decimal_precision: series.decimal_precision(),
            view_bounds: series.view_bounds(),
            history_depth: series.history().len(),
            redo_depth: series.history().redo_len(),
            edit_state,
            fit_in_flight,
        }
    }
}

/// Deterministic state dump used by hosts and regression tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub source: Option<PathBuf>,
    pub ring_count: usize,
    pub radius: Vec<Option<f64>>,
    pub metadata: DefMetadata,
    pub selection: Option<ParameterId>,
    /// Every parsed series name, in document order.
    pub available_parameters: Vec<String>,
    pub series: Vec<SeriesSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: SessionSnapshot,
}

impl SessionSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> DefResult<String> {
        let payload = SessionSnapshotJsonContractV1 {
            schema_version: SESSION_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DefError::InvalidData(format!("failed to serialize session snapshot contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> DefResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<SessionSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: SessionSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            DefError::InvalidData(format!("failed to parse session snapshot json payload: {e}"))
        })?;
        if payload.schema_version != SESSION_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(DefError::InvalidData(format!(
                "unsupported session snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

pub(crate) fn finite_or_none(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|value| value.is_finite().then_some(*value))
        .collect()
}
