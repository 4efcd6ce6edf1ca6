use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::series::SeriesData;
use crate::core::units::RADIUS_KEY;
use crate::error::DefError;

/// Default distance between synthesized rings.
pub const DEFAULT_RING_SPACING: f64 = 40.0;

/// Outcome of aligning series lengths to the declared ring count.
#[derive(Debug)]
pub struct Reconciled {
    pub series: IndexMap<String, SeriesData>,
    /// Series longer than the declared ring count, kept as they are.
    pub ambiguities: Vec<DefError>,
}

/// Pads every series up to `ring_count` rings.
///
/// `RADI` is extended on a regular grid of `spacing` (starting at `0` when
/// empty); other series repeat their last value, or are zero-filled when
/// empty. Longer series are never truncated: each one is reported as a
/// `ReconciliationAmbiguity`. Uncertainties are padded with NaN to match.
#[must_use]
pub fn reconcile(
    mut series: IndexMap<String, SeriesData>,
    ring_count: usize,
    spacing: f64,
) -> Reconciled {
    let mut ambiguities = Vec::new();

    for (name, data) in &mut series {
        let original_len = data.values.len();
        if original_len > ring_count {
            warn!(
                parameter = %name,
                len = original_len,
                declared = ring_count,
                "series longer than declared ring count"
            );
            ambiguities.push(DefError::ReconciliationAmbiguity {
                name: name.clone(),
                len: original_len,
                declared: ring_count,
            });
        } else if original_len < ring_count {
            if name == RADIUS_KEY {
                extend_radius(&mut data.values, ring_count, spacing);
            } else {
                pad_by_repeat(&mut data.values, ring_count);
            }
            debug!(
                parameter = %name,
                from = original_len,
                to = ring_count,
                "padded series to ring count"
            );
        }

        align_uncertainties(name, data);
    }

    Reconciled {
        series,
        ambiguities,
    }
}

fn extend_radius(values: &mut Vec<f64>, ring_count: usize, spacing: f64) {
    let mut next = values.last().map_or(0.0, |last| last + spacing);
    while values.len() < ring_count {
        values.push(next);
        next += spacing;
    }
}

fn pad_by_repeat(values: &mut Vec<f64>, ring_count: usize) {
    let fill = values.last().copied().unwrap_or(0.0);
    values.resize(ring_count, fill);
}

fn align_uncertainties(name: &str, data: &mut SeriesData) {
    let target = data.values.len();
    if data.uncertainties.len() > target {
        warn!(
            parameter = %name,
            len = data.uncertainties.len(),
            rings = target,
            "dropping uncertainties beyond the ring count"
        );
    }
    data.uncertainties.resize(target, f64::NAN);
}
