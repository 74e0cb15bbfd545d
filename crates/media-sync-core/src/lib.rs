pub mod diff;
pub mod dry_run;
pub mod error;
pub mod hydrate;
pub mod pairing;
pub mod ratings;
pub mod reconcile;
pub mod report;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use diff::{compute_diff, rating_updates, DiffResult};
pub use dry_run::DryRunMirror;
pub use error::{Result, SyncError};
pub use hydrate::{HydratedState, Hydrator};
pub use pairing::{contains, CollectionPairing};
pub use ratings::RatingSynchronizer;
pub use reconcile::ListReconciler;
pub use report::SyncReport;
pub use sync::SyncOrchestrator;
