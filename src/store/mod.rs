//! App catalog state, install state machine and status reconciliation

pub mod actions;
pub mod app_store;
pub mod poller;
pub mod reconcile;
pub mod status;
pub mod version;

pub use actions::InstallOutcome;
pub use app_store::{ALL_CATEGORY, AppFilter, AppStore, Scope};
pub use poller::{PollerHandle, ReconcileLoop, TickOutcome};
pub use reconcile::{Reconciler, Transition, Verb};
pub use status::{AppStatus, InstallForm, InstallRejection, UserAction, VersionChoice};
pub use version::compare_versions;
