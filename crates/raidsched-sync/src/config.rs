//! Run configuration.

use std::time::Duration;

use chrono_tz::Tz;

use raidsched_core::ExportOptions;

use crate::error::{SyncError, SyncResult};

/// Configuration of one reconciliation run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Zone duties are read in and the calendar is rendered in.
    pub timezone: Tz,
    /// Channel new events are attached to.
    pub event_channel_id: String,
    /// Guild used for event links when an event does not carry one.
    pub guild_id: Option<String>,
    /// Calendar feed tag.
    pub calendar_tag: String,
    /// Wait between the last mutation and re-listing for the export.
    pub settle_delay: Duration,
}

impl SyncConfig {
    /// Default settle delay in seconds.
    pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 10;

    /// Default calendar tag.
    pub const DEFAULT_CALENDAR_TAG: &'static str = "raidsched";

    /// Creates a configuration for a zone and event channel.
    pub fn new(timezone: Tz, event_channel_id: impl Into<String>) -> Self {
        Self {
            timezone,
            event_channel_id: event_channel_id.into(),
            guild_id: None,
            calendar_tag: Self::DEFAULT_CALENDAR_TAG.to_string(),
            settle_delay: Duration::from_secs(Self::DEFAULT_SETTLE_DELAY_SECS),
        }
    }

    /// Builder: set the fallback guild for event links.
    pub fn with_guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Builder: set the calendar feed tag.
    pub fn with_calendar_tag(mut self, tag: impl Into<String>) -> Self {
        self.calendar_tag = tag.into();
        self
    }

    /// Builder: set the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Returns the export options derived from this configuration.
    pub fn export_options(&self) -> ExportOptions {
        let options = ExportOptions::new(self.timezone, self.calendar_tag.clone());
        match &self.guild_id {
            Some(guild) => options.with_guild_id(guild.clone()),
            None => options,
        }
    }

    /// Checks required values.
    pub fn validate(&self) -> SyncResult<()> {
        if self.event_channel_id.trim().is_empty() {
            return Err(SyncError::config("event channel id is empty"));
        }
        if self.calendar_tag.trim().is_empty() {
            return Err(SyncError::config("calendar tag is empty"));
        }
        Ok(())
    }
}
