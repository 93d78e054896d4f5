//! Discord configuration.

use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Configuration shared by the Discord event directory and notifier.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Bot token (sent as `Authorization: Bot <token>`).
    pub token: String,

    /// Guild whose scheduled events are managed.
    pub guild_id: String,

    /// Voice channel new events are attached to.
    pub event_channel_id: String,

    /// Text channel announcements are posted to.
    pub notification_channel_id: Option<String>,

    /// REST API base URL.
    pub api_base: String,

    /// Announcement template, see [`crate::discord::render_message`].
    pub message_template: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("event_channel_id", &self.event_channel_id)
            .field("notification_channel_id", &self.notification_channel_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DiscordConfig {
    /// Default REST API base.
    pub const DEFAULT_API_BASE: &'static str = "https://discord.com/api";

    /// Default announcement: "today is {title} day".
    pub const DEFAULT_MESSAGE_TEMPLATE: &'static str = "今日は{title}日クポ。 {description}\n{url}\n";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for a guild and event channel.
    pub fn new(
        token: impl Into<String>,
        guild_id: impl Into<String>,
        event_channel_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            guild_id: guild_id.into(),
            event_channel_id: event_channel_id.into(),
            notification_channel_id: None,
            api_base: Self::DEFAULT_API_BASE.to_string(),
            message_template: Self::DEFAULT_MESSAGE_TEMPLATE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("raidsched/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the announcement channel.
    pub fn with_notification_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.notification_channel_id = Some(channel_id.into());
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the announcement template.
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that every required value is present.
    pub fn validate(&self) -> ProviderResult<()> {
        let required = [
            ("token", &self.token),
            ("guild_id", &self.guild_id),
            ("event_channel_id", &self.event_channel_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(
                    ProviderError::configuration(format!("discord {} is empty", field))
                        .with_provider("discord"),
                );
            }
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ProviderError::configuration(format!(
                "discord api_base must be an http(s) URL, got {:?}",
                self.api_base
            ))
            .with_provider("discord"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn defaults() {
        let config = DiscordConfig::new("tok", "guild", "chan");
        assert_eq!(config.api_base, "https://discord.com/api");
        assert!(config.notification_channel_id.is_none());
        assert!(config.message_template.contains("{title}"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_token() {
        let err = DiscordConfig::new(" ", "guild", "chan").validate().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("token"));
    }

    #[test]
    fn validate_rejects_non_http_base() {
        let config = DiscordConfig::new("tok", "guild", "chan").with_api_base("discord.com/api");
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let config = DiscordConfig::new("super-secret", "guild", "chan");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("guild"));
    }
}
