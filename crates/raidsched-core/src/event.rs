//! Published events and the payload used to create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duty::Duty;
use crate::time::EventKey;

/// Base URL of public event pages.
pub const EVENT_PAGE_BASE: &str = "https://discord.com/events";

/// What kind of location a scheduled event is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A stage channel.
    StageInstance,
    /// A voice channel.
    Voice,
    /// Somewhere outside the guild.
    External,
}

impl EntityType {
    /// Returns the numeric wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::StageInstance => 1,
            Self::Voice => 2,
            Self::External => 3,
        }
    }

    /// Parses a numeric wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::StageInstance),
            2 => Some(Self::Voice),
            3 => Some(Self::External),
            _ => None,
        }
    }
}

/// Who can see a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    /// Visible to guild members only.
    GuildOnly,
}

impl PrivacyLevel {
    /// Returns the numeric wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::GuildOnly => 2,
        }
    }

    /// Parses a numeric wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(Self::GuildOnly),
            _ => None,
        }
    }
}

/// An event currently visible in the event directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedEvent {
    /// Identifier assigned by the directory.
    pub id: String,
    /// Event title.
    pub title: String,
    /// Event description, possibly empty.
    pub description: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Entity classifier. `None` for codes this crate does not know.
    pub entity_type: Option<EntityType>,
    /// Privacy classifier. `None` for codes this crate does not know.
    pub privacy_level: Option<PrivacyLevel>,
    /// Channel the event is attached to.
    pub channel_id: Option<String>,
    /// Guild the event belongs to.
    pub guild_id: Option<String>,
}

impl PublishedEvent {
    /// Returns the join key of this event.
    pub fn key(&self) -> EventKey {
        EventKey::from_instant(&self.start)
    }

    /// Returns the public page of this event, if the guild is known.
    pub fn page_url(&self) -> Option<String> {
        self.guild_id
            .as_deref()
            .map(|guild| event_page_url(guild, &self.id))
    }
}

/// Builds the public page URL of an event.
pub fn event_page_url(guild_id: &str, event_id: &str) -> String {
    format!("{}/{}/{}", EVENT_PAGE_BASE, guild_id, event_id)
}

/// The payload for creating an event from a duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Entity classifier.
    pub entity_type: EntityType,
    /// Privacy classifier.
    pub privacy_level: PrivacyLevel,
    /// Channel to attach the event to.
    pub channel_id: String,
}

impl NewEvent {
    /// Builds the voice-channel, guild-only payload for a duty.
    pub fn from_duty(duty: &Duty, channel_id: impl Into<String>) -> Self {
        Self {
            title: duty.title.clone(),
            description: duty.description.clone(),
            start: duty.start,
            end: duty.end,
            entity_type: EntityType::Voice,
            privacy_level: PrivacyLevel::GuildOnly,
            channel_id: channel_id.into(),
        }
    }

    /// Returns the join key of the event this payload will create.
    pub fn key(&self) -> EventKey {
        EventKey::from_instant(&self.start)
    }
}
