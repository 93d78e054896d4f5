//! Run orchestrator: reconcile, announce, prune, export.
//!
//! This crate drives the collaborators of `raidsched-providers` through one
//! batch run:
//! - fetch the intended schedule and the published events
//! - create missing events and announce today's
//! - delete published events no duty asks for
//! - re-list after a settle delay and publish the calendar
//!
//! # Example
//!
//! ```rust,ignore
//! use raidsched_sync::{SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::new(chrono_tz::Asia::Tokyo, voice_channel_id);
//! let engine = SyncEngine::new(config, &directory)?;
//! let report = engine.run(&source, &notifier, &publisher).await?;
//! println!("calendar at {}", report.export.url);
//! ```

mod config;
mod engine;
mod error;

#[cfg(test)]
mod testing;

pub use config::SyncConfig;
pub use engine::{ExportReport, PreparedRun, ReconcileReport, RunReport, SyncEngine};
pub use error::{ErrorKind, Phase, SyncError, SyncResult};
