//! Collaborator traits and their remote implementations.
//!
//! The sync engine never talks HTTP itself. It drives four collaborators:
//!
//! - [`ScheduleSource`] - where the intended duties come from
//! - [`EventDirectory`] - the remote store of published events
//! - [`Notifier`] - posts the "today" announcement
//! - [`CalendarPublisher`] - stores the exported calendar
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌─────────────────────────┐   ┌──────────────────┐
//! │ Google Sheets  │   │ Discord REST API        │   │ Cloud Storage    │
//! └───────┬────────┘   └──────┬─────────────┬────┘   └────────┬─────────┘
//!         │                   │             │                 │
//!         ▼                   ▼             ▼                 ▼
//! ┌────────────────┐ ┌──────────────────┐ ┌───────────────┐ ┌──────────────┐
//! │ SheetsSchedule │ │ DiscordEvent     │ │ Discord       │ │ GcsPublisher │
//! │                │ │ Directory        │ │ Notifier      │ │              │
//! └───────┬────────┘ └────────┬─────────┘ └───────┬───────┘ └──────┬───────┘
//!         │ ScheduleSource    │ EventDirectory    │ Notifier       │ CalendarPublisher
//!         └───────────────────┴─────────┬─────────┴────────────────┘
//!                                       ▼
//!                               raidsched-sync
//! ```

#[cfg(feature = "discord")]
pub mod discord;
pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{
    BoxFuture, CalendarPublisher, EventDirectory, Notifier, Schedule, ScheduleSource,
};
