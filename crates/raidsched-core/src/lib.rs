//! Core types: duties, published events, reconciliation plan, calendar export

pub mod duty;
pub mod error;
pub mod event;
pub mod export;
pub mod plan;
pub mod time;
pub mod tracing;

pub use duty::Duty;
pub use error::{CoreError, CoreResult};
pub use event::{EntityType, NewEvent, PrivacyLevel, PublishedEvent, event_page_url};
pub use export::{
    CALENDAR_CONTENT_TYPE, ExportOptions, ExportRecord, build_export_records, export_uid,
    render_calendar,
};
pub use plan::{DutyAction, ReconciliationPlan};
pub use time::{
    CANONICAL_FORMAT, EventKey, format_canonical, local_instant, parse_timestamp, parse_timezone,
    to_local_wall_clock,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
