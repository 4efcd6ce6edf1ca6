use crate::core::bounds::ViewBounds;

/// State restored by a redo step.
#[derive(Debug, Clone, PartialEq)]
pub struct RedoSnapshot {
    pub values: Vec<f64>,
    pub view_bounds: ViewBounds,
    pub decimal_precision: usize,
}

/// Undo stack of committed value snapshots plus the redo stack it feeds.
///
/// The undo stack is never empty: its first entry is the post-load baseline
/// and its top mirrors the last committed values.
#[derive(Debug, Clone, PartialEq)]
pub struct EditHistory {
    snapshots: Vec<Vec<f64>>,
    redo: Vec<RedoSnapshot>,
}

impl EditHistory {
    #[must_use]
    pub fn new(baseline: Vec<f64>) -> Self {
        Self {
            snapshots: vec![baseline],
            redo: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    #[must_use]
    pub fn top(&self) -> &[f64] {
        self.snapshots.last().map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.snapshots.len() > 1
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Records `values` as a new snapshot unless it equals the top, and
    /// drops the redo stack. Returns `true` when a snapshot was pushed.
    pub fn record(&mut self, values: &[f64]) -> bool {
        self.redo.clear();
        if same_values(self.top(), values) {
            return false;
        }
        self.snapshots.push(values.to_vec());
        true
    }

    /// Pops the top snapshot into the redo stack and returns the new top.
    pub(crate) fn step_back(
        &mut self,
        view_bounds: ViewBounds,
        decimal_precision: usize,
    ) -> Option<&[f64]> {
        if !self.can_undo() {
            return None;
        }
        let values = self.snapshots.pop()?;
        self.redo.push(RedoSnapshot {
            values,
            view_bounds,
            decimal_precision,
        });
        Some(self.top())
    }

    /// Pops a redo bundle and pushes its values back onto the undo stack.
    pub(crate) fn step_forward(&mut self) -> Option<RedoSnapshot> {
        let snapshot = self.redo.pop()?;
        self.snapshots.push(snapshot.values.clone());
        Some(snapshot)
    }
}

/// Bitwise element comparison so NaN entries compare equal to themselves.
#[must_use]
pub fn same_values(left: &[f64], right: &[f64]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(a, b)| a.to_bits() == b.to_bits())
}
