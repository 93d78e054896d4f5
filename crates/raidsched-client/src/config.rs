//! Client configuration.
//!
//! All settings live in one `config.toml`, by default at
//! `~/.config/raidsched/config.toml`:
//!
//! ```toml
//! timezone = "Asia/Tokyo"
//!
//! [discord]
//! token = "pass::discord/raid-bot"
//! guild_id = "123456789012345678"
//! event_channel_id = "234567890123456789"
//! notification_channel_id = "345678901234567890"
//!
//! [sheets]
//! spreadsheet_id = "1AbC..."
//! access_token = "env::SHEETS_ACCESS_TOKEN"
//!
//! [calendar]
//! bucket = "raid-calendar"
//! path = "raid.ics"
//! tag = "raid"
//! access_token = "env::GCS_ACCESS_TOKEN"
//! ```
//!
//! Credential values (`token`, `access_token`) accept secret references
//! (`pass::…`, `env::…`), see [`crate::secret`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use raidsched_core::parse_timezone;
use raidsched_providers::discord::DiscordConfig;
use raidsched_providers::google::{SheetsConfig, StorageConfig};
use raidsched_sync::SyncConfig;

use crate::error::{ClientError, ClientResult};
use crate::secret::resolve_required;

/// Configuration for the raidsched client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// IANA zone duties are read in and the calendar is rendered in.
    pub timezone: String,

    /// Discord settings.
    pub discord: DiscordSettings,

    /// Google Sheets settings.
    pub sheets: SheetsSettings,

    /// Calendar export settings.
    pub calendar: CalendarSettings,

    /// Run settings.
    pub sync: SyncSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            discord: DiscordSettings::default(),
            sheets: SheetsSettings::default(),
            calendar: CalendarSettings::default(),
            sync: SyncSettings::default(),
        }
    }
}

/// Discord settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    /// Bot token (supports `pass::` and `env::` prefixes).
    pub token: Option<String>,
    /// Guild whose scheduled events are managed.
    pub guild_id: Option<String>,
    /// Voice channel new events are attached to.
    pub event_channel_id: Option<String>,
    /// Text channel for the daily announcement.
    pub notification_channel_id: Option<String>,
    /// REST API base URL.
    pub api_base: String,
    /// Announcement template with `{title}`, `{description}` and `{url}`.
    pub message_template: String,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            token: None,
            guild_id: None,
            event_channel_id: None,
            notification_channel_id: None,
            api_base: DiscordConfig::DEFAULT_API_BASE.to_string(),
            message_template: DiscordConfig::DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

/// Google Sheets settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsSettings {
    pub spreadsheet_id: Option<String>,
    /// OAuth bearer token (supports `pass::` and `env::` prefixes).
    pub access_token: Option<String>,
    pub api_base: String,
    pub range: String,
    pub sheet_title_format: String,
    /// Local start time, `HH:MM`.
    pub start_time: String,
    /// Local end time, `HH:MM`.
    pub end_time: String,
    pub default_title: String,
    pub active_marker: String,
    pub notice_prefix: String,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            access_token: None,
            api_base: SheetsConfig::DEFAULT_API_BASE.to_string(),
            range: SheetsConfig::DEFAULT_RANGE.to_string(),
            sheet_title_format: SheetsConfig::DEFAULT_SHEET_TITLE_FORMAT.to_string(),
            start_time: "21:50".to_string(),
            end_time: "23:50".to_string(),
            default_title: SheetsConfig::DEFAULT_TITLE.to_string(),
            active_marker: SheetsConfig::DEFAULT_ACTIVE_MARKER.to_string(),
            notice_prefix: SheetsConfig::DEFAULT_NOTICE_PREFIX.to_string(),
        }
    }
}

/// Calendar export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Storage bucket.
    pub bucket: Option<String>,
    /// Object path inside the bucket.
    pub path: Option<String>,
    /// Feed tag, shown as the calendar name.
    pub tag: String,
    /// OAuth bearer token (supports `pass::` and `env::` prefixes).
    pub access_token: Option<String>,
    pub upload_base: String,
    pub public_base: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            bucket: None,
            path: None,
            tag: SyncConfig::DEFAULT_CALENDAR_TAG.to_string(),
            access_token: None,
            upload_base: StorageConfig::DEFAULT_BASE.to_string(),
            public_base: StorageConfig::DEFAULT_BASE.to_string(),
        }
    }
}

/// Run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Seconds to wait before re-listing events for the export.
    pub settle_delay_secs: u64,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            settle_delay_secs: SyncConfig::DEFAULT_SETTLE_DELAY_SECS,
            http_timeout_secs: 30,
        }
    }
}

fn required(value: &Option<String>, setting: &str) -> ClientResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ClientError::config(format!("{} is not set", setting)))
}

fn secret(value: &Option<String>, setting: &str) -> ClientResult<String> {
    resolve_required(value.as_deref(), setting).map_err(ClientError::Config)
}

fn parse_clock(value: &str, setting: &str) -> ClientResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| ClientError::config(format!("{} must be HH:MM, got {:?}: {}", setting, value, e)))
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("raidsched")
    }

    /// Returns the HTTP timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.http_timeout_secs)
    }

    /// Parses the configured timezone.
    pub fn timezone(&self) -> ClientResult<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }

    /// Builds the Discord configuration, resolving the token.
    pub fn discord_config(&self) -> ClientResult<DiscordConfig> {
        let discord = &self.discord;
        let mut config = DiscordConfig::new(
            secret(&discord.token, "discord.token")?,
            required(&discord.guild_id, "discord.guild_id")?,
            required(&discord.event_channel_id, "discord.event_channel_id")?,
        )
        .with_api_base(discord.api_base.clone())
        .with_message_template(discord.message_template.clone())
        .with_timeout(self.http_timeout());
        if let Some(channel) = discord.notification_channel_id.as_deref() {
            config = config.with_notification_channel(channel);
        }
        config.validate()?;
        Ok(config)
    }

    /// Builds the Sheets configuration, resolving the access token.
    pub fn sheets_config(&self) -> ClientResult<SheetsConfig> {
        let sheets = &self.sheets;
        let config = SheetsConfig::new(
            required(&sheets.spreadsheet_id, "sheets.spreadsheet_id")?,
            secret(&sheets.access_token, "sheets.access_token")?,
        )
        .with_api_base(sheets.api_base.clone())
        .with_range(sheets.range.clone())
        .with_sheet_title_format(sheets.sheet_title_format.clone())
        .with_hours(
            parse_clock(&sheets.start_time, "sheets.start_time")?,
            parse_clock(&sheets.end_time, "sheets.end_time")?,
        )
        .with_default_title(sheets.default_title.clone())
        .with_active_marker(sheets.active_marker.clone())
        .with_notice_prefix(sheets.notice_prefix.clone())
        .with_timeout(self.http_timeout());
        config.validate()?;
        Ok(config)
    }

    /// Builds the storage configuration, resolving the access token.
    pub fn storage_config(&self) -> ClientResult<StorageConfig> {
        let calendar = &self.calendar;
        let config = StorageConfig::new(
            required(&calendar.bucket, "calendar.bucket")?,
            required(&calendar.path, "calendar.path")?,
            secret(&calendar.access_token, "calendar.access_token")?,
        )
        .with_upload_base(calendar.upload_base.clone())
        .with_public_base(calendar.public_base.clone())
        .with_timeout(self.http_timeout());
        config.validate()?;
        Ok(config)
    }

    /// Builds the run configuration.
    pub fn sync_config(&self) -> ClientResult<SyncConfig> {
        let mut config = SyncConfig::new(
            self.timezone()?,
            required(&self.discord.event_channel_id, "discord.event_channel_id")?,
        )
        .with_calendar_tag(self.calendar.tag.clone())
        .with_settle_delay(Duration::from_secs(self.sync.settle_delay_secs));
        if let Some(guild) = self.discord.guild_id.as_deref() {
            config = config.with_guild_id(guild);
        }
        config.validate()?;
        Ok(config)
    }
}
