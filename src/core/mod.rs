pub mod bounds;
pub mod history;
pub mod precision;
pub mod reconcile;
pub mod series;
pub mod typed_value;
pub mod units;

pub use bounds::{AxisRange, RescalePolicy, ViewBounds};
pub use history::{EditHistory, RedoSnapshot};
pub use precision::{format_scientific, max_fractional_digits};
pub use reconcile::{DEFAULT_RING_SPACING, Reconciled, reconcile};
pub use series::{ParameterId, ParameterSeries, RadiusAxis, SeriesData};
pub use typed_value::{TypedValue, parse_number};
pub use units::{RADIUS_KEY, default_unit, is_velocity_like, is_well_known};
