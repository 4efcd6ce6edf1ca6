use serde::{Deserialize, Serialize};

use crate::error::{DefError, DefResult};

/// Visible interval of one plot axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Validated constructor used for user-entered bounds.
    pub fn new(min: f64, max: f64) -> DefResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(DefError::InvalidData(format!(
                "axis bounds must be finite with min < max (got {min}..{max})"
            )));
        }
        Ok(Self { min, max })
    }

    /// Initial bounds framing `values` with `margin` of their span on each side.
    ///
    /// A flat series `v` is framed as `v ± |v|/2`, or `-1..1` when `v == 0`.
    /// Returns `None` when `values` holds no finite number.
    #[must_use]
    pub fn framing(values: &[f64], margin: f64) -> Option<Self> {
        let (lo, hi) = finite_extent(values)?;
        let span = hi - lo;
        if span == 0.0 {
            if lo == 0.0 {
                return Some(Self { min: -1.0, max: 1.0 });
            }
            let half = lo.abs() * 0.5;
            return Some(Self {
                min: lo - half,
                max: lo + half,
            });
        }
        Some(Self {
            min: lo - margin * span,
            max: hi + margin * span,
        })
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Bounds of both plot axes for one series view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl ViewBounds {
    /// Frames a radius axis and a value series.
    #[must_use]
    pub fn framing(radius: &[f64], values: &[f64], margin: f64) -> Self {
        let fallback = AxisRange { min: -1.0, max: 1.0 };
        Self {
            x: AxisRange::framing(radius, margin).unwrap_or(fallback),
            y: AxisRange::framing(values, margin).unwrap_or(fallback),
        }
    }
}

/// Minimum and maximum over the finite entries of `values`.
#[must_use]
pub fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
}

/// Decides when an edit pushes the value axis out to follow the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescalePolicy {
    /// Fraction of the data span added on each side after a rescale.
    pub margin: f64,
    /// Relative distance to a bound that already counts as touching it.
    pub tolerance: f64,
    /// Floor for the data span so a flat series still yields an open range.
    pub min_span: f64,
}

impl Default for RescalePolicy {
    fn default() -> Self {
        Self {
            margin: 0.1,
            tolerance: 0.01,
            min_span: 1e-9,
        }
    }
}

impl RescalePolicy {
    pub(crate) fn validate(self) -> DefResult<Self> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(DefError::InvalidData(
                "rescale margin must be finite and >= 0".to_owned(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(DefError::InvalidData(
                "rescale tolerance must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_span.is_finite() || self.min_span <= 0.0 {
            return Err(DefError::InvalidData(
                "rescale min span must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Returns new value-axis bounds when `values` escape or touch `current`.
    ///
    /// Clauses are checked in order and the first match wins: the minimum at
    /// or past the bottom, the maximum at or past the top, then the minimum or
    /// maximum within `tolerance` of its bound. `None` keeps the view as is.
    #[must_use]
    pub fn rescale(self, current: AxisRange, values: &[f64]) -> Option<AxisRange> {
        let (lo, hi) = finite_extent(values)?;
        let bottom = current.min;
        let top = current.max;

        let escapes_bottom = if same_sign(lo, bottom) {
            lo <= bottom
        } else {
            lo < 0.0 && bottom > 0.0
        };
        let escapes_top = if same_sign(hi, top) {
            hi >= top
        } else {
            hi > 0.0 && top < 0.0
        };

        if escapes_bottom
            || escapes_top
            || self.almost_equal(lo, bottom)
            || self.almost_equal(hi, top)
        {
            let span = (hi - lo).max(self.min_span);
            return Some(AxisRange {
                min: lo - self.margin * span,
                max: hi + self.margin * span,
            });
        }
        None
    }

    fn almost_equal(self, value: f64, bound: f64) -> bool {
        (bound - value).abs() <= (self.tolerance * bound).abs()
    }
}

fn same_sign(a: f64, b: f64) -> bool {
    sign_class(a) == sign_class(b)
}

fn sign_class(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
