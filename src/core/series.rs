use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::bounds::{AxisRange, ViewBounds};
use crate::core::history::EditHistory;
use crate::core::units::default_unit;
use crate::error::{DefError, DefResult, HistoryOperation};

/// Ring-centre positions shared by every series of one document.
pub type RadiusAxis = Arc<[f64]>;

/// Case-insensitive parameter identifier, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(String);

impl ParameterId {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ParameterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParameterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Plain per-ring data as read from a document, before it becomes editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub values: Vec<f64>,
    pub uncertainties: Vec<f64>,
    pub decimal_precision: usize,
}

impl SeriesData {
    /// Series without uncertainty information (all NaN).
    #[must_use]
    pub fn new(values: Vec<f64>, decimal_precision: usize) -> Self {
        let uncertainties = vec![f64::NAN; values.len()];
        Self {
            values,
            uncertainties,
            decimal_precision,
        }
    }
}

/// One editable tilted-ring parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSeries {
    id: ParameterId,
    unit: String,
    values: Vec<f64>,
    uncertainties: Vec<f64>,
    radius: RadiusAxis,
    decimal_precision: usize,
    view_bounds: ViewBounds,
    history: EditHistory,
}

impl ParameterSeries {
    /// Creates a series whose history baseline is `values`.
    ///
    /// The unit defaults from the well-known parameter table, uncertainties
    /// start as NaN and the view frames the data with a 10% margin.
    #[must_use]
    pub fn new(name: &str, values: Vec<f64>, radius: RadiusAxis) -> Self {
        let id = ParameterId::new(name);
        let unit = default_unit(id.as_str()).unwrap_or_default().to_owned();
        let uncertainties = vec![f64::NAN; values.len()];
        let view_bounds = ViewBounds::framing(&radius, &values, 0.1);
        let history = EditHistory::new(values.clone());
        Self {
            id,
            unit,
            values,
            uncertainties,
            radius,
            decimal_precision: 0,
            view_bounds,
            history,
        }
    }

    /// Builds a series from parsed document data.
    #[must_use]
    pub fn from_data(name: &str, data: SeriesData, radius: RadiusAxis) -> Self {
        let SeriesData {
            values,
            uncertainties,
            decimal_precision,
        } = data;
        Self::new(name, values, radius)
            .with_uncertainties(uncertainties)
            .with_decimal_precision(decimal_precision)
    }

    /// Sets the unit label; an empty label keeps the table default.
    #[must_use]
    pub fn with_unit(mut self, unit: &str) -> Self {
        if !unit.trim().is_empty() {
            self.unit = unit.trim().to_owned();
        }
        self
    }

    /// Sets uncertainties, padded with NaN or cut to the value count.
    #[must_use]
    pub fn with_uncertainties(mut self, mut uncertainties: Vec<f64>) -> Self {
        uncertainties.resize(self.values.len(), f64::NAN);
        self.uncertainties = uncertainties;
        self
    }

    #[must_use]
    pub fn with_decimal_precision(mut self, decimal_precision: usize) -> Self {
        self.decimal_precision = decimal_precision;
        self
    }

    #[must_use]
    pub fn with_view_bounds(mut self, view_bounds: ViewBounds) -> Self {
        self.view_bounds = view_bounds;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ParameterId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn set_unit(&mut self, unit: &str) {
        self.unit = unit.trim().to_owned();
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn uncertainties(&self) -> &[f64] {
        &self.uncertainties
    }

    #[must_use]
    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    #[must_use]
    pub fn radius_axis(&self) -> &RadiusAxis {
        &self.radius
    }

    /// Re-points the series at a new shared radius axis.
    pub fn set_radius(&mut self, radius: RadiusAxis) {
        self.radius = radius;
    }

    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn decimal_precision(&self) -> usize {
        self.decimal_precision
    }

    #[must_use]
    pub fn view_bounds(&self) -> ViewBounds {
        self.view_bounds
    }

    pub fn set_view_bounds(&mut self, view_bounds: ViewBounds) {
        self.view_bounds = view_bounds;
    }

    pub fn set_x_bounds(&mut self, x: AxisRange) {
        self.view_bounds.x = x;
    }

    pub fn set_y_bounds(&mut self, y: AxisRange) {
        self.view_bounds.y = y;
    }

    #[must_use]
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Values differ from the last committed snapshot (a drag is pending).
    #[must_use]
    pub fn has_uncommitted_changes(&self) -> bool {
        !crate::core::history::same_values(self.history.top(), &self.values)
    }

    /// Writes one ring without touching history.
    pub fn set_value(&mut self, ring: usize, value: f64) -> DefResult<()> {
        let ring_count = self.values.len();
        let slot = self.values.get_mut(ring).ok_or_else(|| {
            DefError::InvalidData(format!(
                "ring index {ring} out of range for {ring_count} rings"
            ))
        })?;
        *slot = value;
        Ok(())
    }

    /// Replaces the values and records them in history.
    ///
    /// The redo stack is always cleared. Returns `true` when a new snapshot
    /// was pushed (identical values are not recorded twice).
    pub fn commit(&mut self, new_values: Vec<f64>) -> DefResult<bool> {
        if new_values.len() != self.values.len() {
            return Err(DefError::InvalidData(format!(
                "series `{}` expects {} values, got {}",
                self.id,
                self.values.len(),
                new_values.len()
            )));
        }
        self.values = new_values;
        Ok(self.commit_current())
    }

    /// Records the current values (after a drag) in history.
    pub fn commit_current(&mut self) -> bool {
        let pushed = self.history.record(&self.values);
        trace!(
            parameter = %self.id,
            pushed,
            depth = self.history.len(),
            "commit series values"
        );
        pushed
    }

    pub fn undo(&mut self) -> DefResult<()> {
        let restored = self
            .history
            .step_back(self.view_bounds, self.decimal_precision)
            .map(<[f64]>::to_vec)
            .ok_or(DefError::HistoryExhausted {
                operation: HistoryOperation::Undo,
            })?;
        self.values = restored;
        trace!(parameter = %self.id, depth = self.history.len(), "undo");
        Ok(())
    }

    pub fn redo(&mut self) -> DefResult<()> {
        let snapshot = self
            .history
            .step_forward()
            .ok_or(DefError::HistoryExhausted {
                operation: HistoryOperation::Redo,
            })?;
        self.values = snapshot.values;
        self.view_bounds = snapshot.view_bounds;
        self.decimal_precision = snapshot.decimal_precision;
        trace!(parameter = %self.id, depth = self.history.len(), "redo");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ParameterId, ParameterSeries};
    use crate::error::DefError;

    fn series(values: Vec<f64>) -> ParameterSeries {
        let radius: Arc<[f64]> = (0..values.len()).map(|i| i as f64 * 40.0).collect();
        ParameterSeries::new("vrot", values, radius)
    }

    #[test]
    fn ids_are_upper_case() {
        assert_eq!(ParameterId::new(" vrot ").as_str(), "VROT");
        assert_eq!(series(vec![1.0]).name(), "VROT");
        assert_eq!(series(vec![1.0]).unit(), "km s-1");
    }

    #[test]
    fn commit_rejects_length_change() {
        let mut s = series(vec![1.0, 2.0]);
        let err = s.commit(vec![1.0]).expect_err("length mismatch");
        assert!(matches!(err, DefError::InvalidData(_)));
        assert_eq!(s.values(), &[1.0, 2.0]);
    }

    #[test]
    fn set_value_marks_pending_changes() {
        let mut s = series(vec![1.0, 2.0]);
        s.set_value(1, 5.0).expect("set");
        assert!(s.has_uncommitted_changes());
        assert!(s.commit_current());
        assert!(!s.has_uncommitted_changes());
        assert!(s.set_value(2, 0.0).is_err());
    }

    #[test]
    fn uncertainties_follow_value_count() {
        let s = series(vec![1.0, 2.0, 3.0]).with_uncertainties(vec![0.5]);
        assert_eq!(s.uncertainties()[0], 0.5);
        assert!(s.uncertainties()[1].is_nan());
        assert_eq!(s.uncertainties().len(), 3);
    }
}
