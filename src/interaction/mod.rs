mod controller;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::bounds::RescalePolicy;
use crate::core::series::ParameterId;
use crate::error::{DefError, DefResult};

pub use controller::EditController;

/// Input delivered to an [`EditController`], in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    PointerDown {
        x: f64,
        y: f64,
    },
    /// `y` is `None` when the pointer has left the plot vertically.
    PointerMove {
        y: Option<f64>,
    },
    PointerUp,
    DoubleClick {
        x: f64,
        y: f64,
    },
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditState {
    #[default]
    Idle,
    Dragging {
        ring: usize,
    },
}

/// What a handled command did to the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EditOutcome {
    /// The command did not apply in the current state, or missed every ring.
    Ignored,
    DragStarted {
        ring: usize,
    },
    /// Uncommitted drag step.
    ValueMoved {
        ring: usize,
        value: f64,
        rescaled: bool,
    },
    /// Drag finished; `recorded` is false when the values did not change.
    Committed {
        recorded: bool,
    },
    /// Value typed after a double-click, committed at once.
    ValueEntered {
        ring: usize,
        value: f64,
        rescaled: bool,
    },
    PromptDismissed,
    Undone,
    Redone,
}

/// Hit-testing and drag tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditTuning {
    /// Largest `|radius - x|` that still grabs a ring (inclusive).
    pub hit_radius: f64,
    /// Relative step applied per move while the pointer is off the plot.
    pub overshoot: f64,
    pub rescale: RescalePolicy,
}

impl Default for EditTuning {
    fn default() -> Self {
        Self {
            hit_radius: 3.0,
            overshoot: 0.1,
            rescale: RescalePolicy::default(),
        }
    }
}

impl EditTuning {
    pub(crate) fn validate(self) -> DefResult<Self> {
        if !self.hit_radius.is_finite() || self.hit_radius < 0.0 {
            return Err(DefError::InvalidData(
                "hit radius must be finite and >= 0".to_owned(),
            ));
        }
        if !self.overshoot.is_finite() {
            return Err(DefError::InvalidData(
                "overshoot factor must be finite".to_owned(),
            ));
        }
        self.rescale.validate()?;
        Ok(self)
    }
}

/// Asks the user for a value after a double-click.
pub trait ValuePrompt {
    /// Returns the entered text, or `None` when the prompt was dismissed.
    fn request_value(
        &mut self,
        parameter: &ParameterId,
        ring: usize,
        current: f64,
    ) -> Option<String>;
}

/// Prompt that is always dismissed; for hosts without value entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl ValuePrompt for NoPrompt {
    fn request_value(&mut self, _: &ParameterId, _: usize, _: f64) -> Option<String> {
        None
    }
}

impl<F> ValuePrompt for F
where
    F: FnMut(&ParameterId, usize, f64) -> Option<String>,
{
    fn request_value(
        &mut self,
        parameter: &ParameterId,
        ring: usize,
        current: f64,
    ) -> Option<String> {
        self(parameter, ring, current)
    }
}

/// Index of the ring closest to `x`, if within `threshold`.
///
/// Ties resolve to the lower index.
#[must_use]
pub fn nearest_ring(radius: &[f64], x: f64, threshold: f64) -> Option<usize> {
    if !x.is_finite() {
        return None;
    }
    radius
        .iter()
        .enumerate()
        .map(|(ring, r)| (OrderedFloat((r - x).abs()), ring))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| distance.0 <= threshold)
        .map(|(_, ring)| ring)
}
