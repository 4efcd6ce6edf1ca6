//! Log output for hosts embedding `ringdef`.
//!
//! The crate emits `tracing` events with structured fields:
//! - `info`: a `.def` file was loaded, or prepared for a modeling run.
//! - `warn`: load-time leniency (series longer than `NUR`, dropped
//!   uncertainties, skipped `_ERR` rows, unparsable `LOOPS`), editor
//!   snapshots that changed the ring count, rejected `NUR` values, failed
//!   fits.
//! - `debug`: parse and reconcile summaries, commits, working-set changes,
//!   fit jobs starting and landing, file writes.
//! - `trace`: per-drag steps and snapshot file polling.
//!
//! Nothing is printed unless a subscriber is installed, either by the host or
//! through [`init_default_tracing`].

/// Default filter when `RUST_LOG` is unset: load/run notices and warnings.
pub const DEFAULT_FILTER: &str = "ringdef=info";

/// Installs a compact `fmt` subscriber when the `telemetry` feature is on.
///
/// Reads `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Returns `false` when
/// the feature is off or the host already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
