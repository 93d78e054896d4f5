//! Collaborator traits.
//!
//! The sync engine talks to the outside world only through these traits:
//!
//! - [`ScheduleSource`] supplies the intended duties and today's instant
//! - [`EventDirectory`] lists, creates and deletes published events
//! - [`Notifier`] announces one published event
//! - [`CalendarPublisher`] stores the rendered calendar and returns its URL
//!
//! An [`EventDirectory`] implementation owns the remote rate-limit contract:
//! each of its methods returns only after the reset-after wait of its
//! response has elapsed, so callers may issue the next call immediately.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use raidsched_core::{Duty, NewEvent, PublishedEvent};

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object-safe so the engine can hold
/// `&dyn EventDirectory` and tests can swap in fakes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The intended schedule for this run.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    /// Duties in source order.
    pub duties: Vec<Duty>,
    /// The instant that counts as "today" for announcements.
    pub today: DateTime<Utc>,
    /// Periods the source expected but could not find.
    pub missing_periods: Vec<String>,
}

impl Schedule {
    /// Creates a schedule.
    pub fn new(duties: Vec<Duty>, today: DateTime<Utc>) -> Self {
        Self {
            duties,
            today,
            missing_periods: Vec::new(),
        }
    }

    /// Builder: record a missing period.
    pub fn with_missing_period(mut self, period: impl Into<String>) -> Self {
        self.missing_periods.push(period.into());
        self
    }
}

/// Supplies intended events.
pub trait ScheduleSource: Send + Sync {
    /// Returns the name of this source (e.g. "sheets").
    fn name(&self) -> &str;

    /// Fetches the duties of the current and next period.
    ///
    /// # Errors
    ///
    /// Transport failures and malformed rows are errors. A missing period is
    /// not: it is reported in [`Schedule::missing_periods`].
    fn fetch(&self, timezone: Tz) -> BoxFuture<'_, ProviderResult<Schedule>>;
}

/// The remote store of published events.
pub trait EventDirectory: Send + Sync {
    /// Returns the name of this directory (e.g. "discord").
    fn name(&self) -> &str;

    /// Lists every published event.
    fn list(&self) -> BoxFuture<'_, ProviderResult<Vec<PublishedEvent>>>;

    /// Creates an event and returns it as stored remotely.
    fn create<'a>(&'a self, event: &'a NewEvent) -> BoxFuture<'a, ProviderResult<PublishedEvent>>;

    /// Deletes an event by remote identifier.
    fn delete<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Sends a human-readable announcement for one event.
pub trait Notifier: Send + Sync {
    /// Returns the name of this notifier.
    fn name(&self) -> &str;

    /// Announces `event`.
    fn announce<'a>(&'a self, event: &'a PublishedEvent) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Persists a calendar document.
pub trait CalendarPublisher: Send + Sync {
    /// Returns the name of this publisher.
    fn name(&self) -> &str;

    /// Stores `document` and returns its public URL.
    fn publish<'a>(
        &'a self,
        document: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>>;
}
