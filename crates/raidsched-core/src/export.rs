//! Calendar export: stable identifiers and iCalendar rendering.
//!
//! Export records are a pure transform of the published events. The UID of a
//! record depends only on the title and the start key, so an event that is
//! deleted and recreated remotely keeps the same UID in the feed and
//! subscribers do not see duplicates.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use data_encoding::BASE32HEX_NOPAD;
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::event::{PublishedEvent, event_page_url};
use crate::time::{EventKey, to_local_wall_clock};

/// Namespace mixed into every UID.
pub const UID_NAMESPACE: &str = "ffxiv-raid-scheduler";

/// Content type of the rendered document.
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar";

/// Derives the export UID of an event.
///
/// SHA-256 over namespace, title and start key, encoded as lowercase
/// unpadded base32hex (52 characters).
pub fn export_uid(title: &str, start: &EventKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(UID_NAMESPACE.as_bytes());
    hasher.update(title.as_bytes());
    hasher.update(start.as_str().as_bytes());
    BASE32HEX_NOPAD
        .encode(&hasher.finalize())
        .to_ascii_lowercase()
}

/// Options shared by every record of one export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Zone the wall-clock times are rendered in.
    pub timezone: Tz,
    /// Feed tag, rendered as the calendar name.
    pub tag: String,
    /// Guild used for links when an event does not carry its own.
    pub guild_id: Option<String>,
}

impl ExportOptions {
    /// Creates export options for a zone and tag.
    pub fn new(timezone: Tz, tag: impl Into<String>) -> Self {
        Self {
            timezone,
            tag: tag.into(),
            guild_id: None,
        }
    }

    /// Builder: set the fallback guild for event links.
    pub fn with_guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

/// One exported event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub uid: String,
    pub summary: String,
    pub description: String,
    /// Start, as wall clock in `timezone`.
    pub start: NaiveDateTime,
    /// End, as wall clock in `timezone`.
    pub end: NaiveDateTime,
    pub timezone: String,
    pub url: Option<String>,
}

impl ExportRecord {
    /// Builds the record of one published event.
    pub fn from_event(event: &PublishedEvent, options: &ExportOptions) -> Self {
        let url = event.page_url().or_else(|| {
            options
                .guild_id
                .as_deref()
                .map(|guild| event_page_url(guild, &event.id))
        });

        Self {
            uid: export_uid(&event.title, &event.key()),
            summary: event.title.clone(),
            description: event.description.clone(),
            start: to_local_wall_clock(&event.start, &options.timezone),
            end: to_local_wall_clock(&event.end, &options.timezone),
            timezone: options.timezone.name().to_string(),
            url,
        }
    }

    fn to_ical(&self, generated_at: DateTime<Utc>) -> Event {
        let mut event = Event::new();
        event
            .uid(&self.uid)
            .summary(&self.summary)
            .timestamp(generated_at)
            .starts(CalendarDateTime::WithTimezone {
                date_time: self.start,
                tzid: self.timezone.clone(),
            })
            .ends(CalendarDateTime::WithTimezone {
                date_time: self.end,
                tzid: self.timezone.clone(),
            });

        if !self.description.is_empty() {
            event.description(&self.description);
        }
        if let Some(ref url) = self.url {
            event.add_property("URL", url);
        }

        event.done()
    }
}

/// Builds export records for every published event, in directory order.
pub fn build_export_records(events: &[PublishedEvent], options: &ExportOptions) -> Vec<ExportRecord> {
    events
        .iter()
        .map(|event| ExportRecord::from_event(event, options))
        .collect()
}

/// Renders records as an iCalendar document.
pub fn render_calendar(
    records: &[ExportRecord],
    options: &ExportOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let mut calendar = Calendar::new();
    calendar
        .name(&options.tag)
        .timezone(options.timezone.name());

    for record in records {
        calendar.push(record.to_ical(generated_at));
    }

    calendar.done().to_string()
}
