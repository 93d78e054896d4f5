//! Google collaborators.
//!
//! - [`SheetsSchedule`] reads duties from month sheets of a spreadsheet
//! - [`GcsPublisher`] uploads the exported calendar to a bucket
//!
//! Both authenticate with a bearer access token taken from configuration.
//! Obtaining and refreshing that token is left to the deployment (for
//! example a service account's metadata server or `gcloud auth
//! print-access-token` behind a `pass::` or `env::` reference).

mod config;
mod http;
mod rows;
mod sheets;
mod storage;

pub use config::{DEFAULT_TIMEOUT_SECS, MONTH_PLACEHOLDER, SheetsConfig, StorageConfig};
pub use rows::{MonthSheet, parse_rows, target_months};
pub use sheets::SheetsSchedule;
pub use storage::GcsPublisher;
