//! Contract with an external polynomial-fit routine.
//!
//! The numerics live behind [`PolynomialFitter`]; this module builds the
//! request from a series, validates it and runs it off the interaction
//! thread through [`FitWorker`].

mod worker;

use serde::{Deserialize, Serialize};

use crate::core::series::{ParameterId, ParameterSeries};
use crate::core::units::is_velocity_like;
use crate::error::{DefError, DefResult};

pub use worker::{FitJob, FitPoll, FitWorker};

pub const MAX_POLYNOMIAL_DEGREE: u8 = 8;
pub const DEFAULT_INNER_FIXED_RINGS: usize = 4;

/// User choices for a fit, before they are bound to a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Inclusive `(min, max)` polynomial degree, within `1..=8`.
    pub degree_range: (u8, u8),
    #[serde(default)]
    pub boundary_limits: Option<(f64, f64)>,
    #[serde(default = "default_inner_fixed_rings")]
    pub inner_fixed_rings: usize,
    /// Honoured for velocity-like parameters only.
    #[serde(default)]
    pub outer_flat_rings: Option<usize>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            degree_range: (1, MAX_POLYNOMIAL_DEGREE),
            boundary_limits: None,
            inner_fixed_rings: DEFAULT_INNER_FIXED_RINGS,
            outer_flat_rings: None,
        }
    }
}

impl FitOptions {
    #[must_use]
    pub fn with_degree_range(mut self, min: u8, max: u8) -> Self {
        self.degree_range = (min, max);
        self
    }

    #[must_use]
    pub fn with_boundary_limits(mut self, lower: f64, upper: f64) -> Self {
        self.boundary_limits = Some((lower, upper));
        self
    }

    #[must_use]
    pub fn with_inner_fixed_rings(mut self, rings: usize) -> Self {
        self.inner_fixed_rings = rings;
        self
    }

    #[must_use]
    pub fn with_outer_flat_rings(mut self, rings: usize) -> Self {
        self.outer_flat_rings = Some(rings);
        self
    }
}

fn default_inner_fixed_rings() -> usize {
    DEFAULT_INNER_FIXED_RINGS
}

/// Everything the fitter needs, copied out of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRequest {
    pub parameter: ParameterId,
    pub radii: Vec<f64>,
    pub values: Vec<f64>,
    pub uncertainties: Vec<f64>,
    pub boundary_limits: Option<(f64, f64)>,
    pub degree_range: (u8, u8),
    pub inner_fixed_rings: usize,
    pub outer_flat_rings: Option<usize>,
    /// Value the fit must pass through at the centre.
    pub zero_point: Option<f64>,
}

impl FitRequest {
    /// Binds `options` to the current state of `series`.
    ///
    /// Velocity-like parameters always keep the default inner ring count and
    /// are pinned to their first value; outer flat rings are dropped for
    /// every other parameter.
    pub fn from_series(series: &ParameterSeries, options: FitOptions) -> DefResult<Self> {
        let velocity = is_velocity_like(series.name());
        let rings = series.ring_count().min(series.radius().len());
        let request = Self {
            parameter: series.id().clone(),
            radii: series.radius()[..rings].to_vec(),
            values: series.values()[..rings].to_vec(),
            uncertainties: series.uncertainties()[..rings].to_vec(),
            boundary_limits: options.boundary_limits,
            degree_range: options.degree_range,
            inner_fixed_rings: if velocity {
                DEFAULT_INNER_FIXED_RINGS
            } else {
                options.inner_fixed_rings
            },
            outer_flat_rings: options.outer_flat_rings.filter(|_| velocity),
            zero_point: if velocity {
                series.values().first().copied()
            } else {
                None
            },
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> DefResult<()> {
        let (min, max) = self.degree_range;
        if min < 1 || max > MAX_POLYNOMIAL_DEGREE || min > max {
            return Err(DefError::InvalidData(format!(
                "polynomial degree range must lie within 1..={MAX_POLYNOMIAL_DEGREE} with min <= max (got {min}..={max})"
            )));
        }
        if self.values.is_empty() {
            return Err(DefError::InvalidData(format!(
                "cannot fit empty series `{}`",
                self.parameter
            )));
        }
        if self.radii.len() != self.values.len() || self.uncertainties.len() != self.values.len()
        {
            return Err(DefError::InvalidData(format!(
                "fit inputs for `{}` differ in length",
                self.parameter
            )));
        }
        if let Some((lower, upper)) = self.boundary_limits {
            if !lower.is_finite() || !upper.is_finite() || lower >= upper {
                return Err(DefError::InvalidData(format!(
                    "fit boundary limits must be finite with lower < upper (got {lower}..{upper})"
                )));
            }
        }
        if self.inner_fixed_rings > self.values.len() {
            return Err(DefError::InvalidData(format!(
                "{} inner fixed rings exceed {} rings",
                self.inner_fixed_rings,
                self.values.len()
            )));
        }
        if self
            .outer_flat_rings
            .is_some_and(|rings| rings > self.values.len())
        {
            return Err(DefError::InvalidData(
                "outer flat rings exceed the ring count".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Fitted values and the degree the fitter settled on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResponse {
    pub values: Vec<f64>,
    pub degree: u8,
}

/// Numerical fitting routine. Called on a worker thread.
pub trait PolynomialFitter: Send + Sync {
    fn fit(&self, request: &FitRequest) -> DefResult<FitResponse>;
}

impl<F> PolynomialFitter for F
where
    F: Fn(&FitRequest) -> DefResult<FitResponse> + Send + Sync,
{
    fn fit(&self, request: &FitRequest) -> DefResult<FitResponse> {
        self(request)
    }
}
