mod config;
mod fit_coordinator;
mod session;
mod session_snapshot;
mod snapshot_watch;

pub use config::{
    DEFAULT_WORKING_SET, EDITOR_CONFIG_JSON_SCHEMA_V1, EditorConfig, EditorConfigJsonContractV1,
};
pub use fit_coordinator::FitCoordinator;
pub use session::{RunPlan, Session};
pub use session_snapshot::{
    SESSION_SNAPSHOT_JSON_SCHEMA_V1, SeriesSnapshot, SessionSnapshot,
    SessionSnapshotJsonContractV1,
};
pub use snapshot_watch::SnapshotWatcher;
