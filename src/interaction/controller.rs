use tracing::{debug, trace};

use crate::core::series::ParameterSeries;
use crate::core::typed_value::parse_number;
use crate::error::{DefError, DefResult};
use crate::interaction::{
    EditCommand, EditOutcome, EditState, EditTuning, ValuePrompt, nearest_ring,
};

/// Pointer state machine for one parameter plot.
///
/// Drags write through [`ParameterSeries::set_value`] without touching
/// history; the drag is committed as a single snapshot on pointer-up, or
/// before any double-click, undo or redo that interrupts it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditController {
    state: EditState,
    last_y: Option<f64>,
    tuning: EditTuning,
}

impl Default for EditController {
    fn default() -> Self {
        Self::new(EditTuning::default())
    }
}

impl EditController {
    #[must_use]
    pub fn new(tuning: EditTuning) -> Self {
        Self {
            state: EditState::Idle,
            last_y: None,
            tuning,
        }
    }

    #[must_use]
    pub fn state(&self) -> EditState {
        self.state
    }

    #[must_use]
    pub fn tuning(&self) -> EditTuning {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: EditTuning) {
        self.tuning = tuning;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditState::Dragging { .. })
    }

    /// Applies one command to `series`.
    ///
    /// On error the series and the controller state are left as they were
    /// before the command, except that an interrupted drag stays committed.
    pub fn handle(
        &mut self,
        series: &mut ParameterSeries,
        command: EditCommand,
        prompt: &mut dyn ValuePrompt,
    ) -> DefResult<EditOutcome> {
        match command {
            EditCommand::PointerDown { x, .. } => Ok(self.pointer_down(series, x)),
            EditCommand::PointerMove { y } => self.pointer_move(series, y),
            EditCommand::PointerUp => Ok(self.pointer_up(series)),
            EditCommand::DoubleClick { x, .. } => self.double_click(series, x, prompt),
            EditCommand::Undo => {
                self.finish_drag(series);
                series.undo()?;
                self.rescale(series);
                Ok(EditOutcome::Undone)
            }
            EditCommand::Redo => {
                self.finish_drag(series);
                series.redo()?;
                Ok(EditOutcome::Redone)
            }
        }
    }

    /// Commits a drag in progress, if any. Returns the commit outcome.
    pub fn finish_drag(&mut self, series: &mut ParameterSeries) -> Option<bool> {
        if !self.is_dragging() {
            return None;
        }
        self.state = EditState::Idle;
        self.last_y = None;
        Some(series.commit_current())
    }

    fn pointer_down(&mut self, series: &mut ParameterSeries, x: f64) -> EditOutcome {
        self.finish_drag(series);
        match nearest_ring(series.radius(), x, self.tuning.hit_radius) {
            Some(ring) if ring < series.ring_count() => {
                self.state = EditState::Dragging { ring };
                self.last_y = None;
                trace!(parameter = %series.id(), ring, "drag started");
                EditOutcome::DragStarted { ring }
            }
            _ => EditOutcome::Ignored,
        }
    }

    fn pointer_move(
        &mut self,
        series: &mut ParameterSeries,
        y: Option<f64>,
    ) -> DefResult<EditOutcome> {
        let EditState::Dragging { ring } = self.state else {
            return Ok(EditOutcome::Ignored);
        };

        let value = match y {
            Some(y) if y.is_finite() => y,
            Some(y) => {
                return Err(DefError::InvalidData(format!(
                    "pointer position {y} is not finite"
                )));
            }
            None => {
                let last = self
                    .last_y
                    .unwrap_or_else(|| series.values().get(ring).copied().unwrap_or(0.0));
                last + self.tuning.overshoot * last
            }
        };

        series.set_value(ring, value)?;
        self.last_y = Some(value);
        let rescaled = self.rescale(series);
        Ok(EditOutcome::ValueMoved {
            ring,
            value,
            rescaled,
        })
    }

    fn pointer_up(&mut self, series: &mut ParameterSeries) -> EditOutcome {
        match self.finish_drag(series) {
            Some(recorded) => {
                debug!(
                    parameter = %series.id(),
                    recorded,
                    depth = series.history().len(),
                    "drag committed"
                );
                EditOutcome::Committed { recorded }
            }
            None => EditOutcome::Ignored,
        }
    }

    fn double_click(
        &mut self,
        series: &mut ParameterSeries,
        x: f64,
        prompt: &mut dyn ValuePrompt,
    ) -> DefResult<EditOutcome> {
        self.finish_drag(series);
        let Some(ring) = nearest_ring(series.radius(), x, self.tuning.hit_radius)
            .filter(|ring| *ring < series.ring_count())
        else {
            return Ok(EditOutcome::Ignored);
        };

        let current = series.values()[ring];
        let Some(text) = prompt.request_value(series.id(), ring, current) else {
            return Ok(EditOutcome::PromptDismissed);
        };
        let value = parse_number(text.trim())
            .filter(|value| value.is_finite())
            .ok_or_else(|| DefError::InvalidData(format!("`{}` is not a number", text.trim())))?;

        series.set_value(ring, value)?;
        let rescaled = self.rescale(series);
        series.commit_current();
        debug!(parameter = %series.id(), ring, value, "value entered");
        Ok(EditOutcome::ValueEntered {
            ring,
            value,
            rescaled,
        })
    }

    fn rescale(&self, series: &mut ParameterSeries) -> bool {
        let current = series.view_bounds().y;
        match self.tuning.rescale.rescale(current, series.values()) {
            Some(y) => {
                series.set_y_bounds(y);
                trace!(parameter = %series.id(), min = y.min, max = y.max, "value axis rescaled");
                true
            }
            None => false,
        }
    }
}
