//! Discord REST client.
//!
//! Every scheduled-event response carries an `X-RateLimit-Reset-After`
//! header. The client waits that long before handing the response back,
//! so the next call can be issued right away. A response without a usable
//! header is an error: the run cannot know how long to wait.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use raidsched_core::{
    EntityType, NewEvent, PrivacyLevel, PublishedEvent, format_canonical, parse_timestamp,
};

use super::config::DiscordConfig;
use crate::error::{ProviderError, ProviderResult};

/// Header carrying the number of seconds until the rate-limit bucket resets.
pub const RESET_AFTER_HEADER: &str = "x-ratelimit-reset-after";

const PROVIDER: &str = "discord";

/// Low-level Discord API client.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http_client: reqwest::Client,
    config: DiscordConfig,
}

impl DiscordClient {
    /// Creates a client after validating `config`.
    pub fn new(config: DiscordConfig) -> ProviderResult<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_provider(PROVIDER)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    fn events_url(&self) -> String {
        format!(
            "{}/guilds/{}/scheduled-events",
            self.config.api_base.trim_end_matches('/'),
            self.config.guild_id
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bot {}", self.config.token))
    }

    /// Lists the guild's scheduled events.
    pub async fn list_events(&self) -> ProviderResult<Vec<ApiScheduledEvent>> {
        let url = self.events_url();
        let body = self
            .execute_rate_limited(self.request(Method::GET, &url), "list scheduled events")
            .await?;
        let events: Vec<ApiScheduledEvent> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse event list: {}", e))
                .with_provider(PROVIDER)
                .with_source(e)
        })?;
        debug!(count = events.len(), "listed scheduled events");
        Ok(events)
    }

    /// Creates a scheduled event and returns it as stored.
    pub async fn create_event(&self, payload: &ApiCreateEvent) -> ProviderResult<ApiScheduledEvent> {
        let url = self.events_url();
        let body = self
            .execute_rate_limited(
                self.request(Method::POST, &url).json(payload),
                "create scheduled event",
            )
            .await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse created event: {}", e))
                .with_provider(PROVIDER)
                .with_source(e)
        })
    }

    /// Deletes a scheduled event.
    pub async fn delete_event(&self, event_id: &str) -> ProviderResult<()> {
        let url = format!("{}/{}", self.events_url(), event_id);
        self.execute_rate_limited(self.request(Method::DELETE, &url), "delete scheduled event")
            .await?;
        Ok(())
    }

    /// Posts a text message to a channel.
    ///
    /// Messages live in a different rate-limit bucket than scheduled events,
    /// so no reset wait is applied here.
    pub async fn post_message(&self, channel_id: &str, content: &str) -> ProviderResult<()> {
        let url = format!(
            "{}/channels/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            channel_id
        );
        let payload = ApiMessage { content };
        self.execute(self.request(Method::POST, &url).json(&payload), "post message")
            .await?;
        Ok(())
    }

    /// Sends a request and maps transport failures and non-success statuses.
    async fn execute(&self, request: RequestBuilder, what: &str) -> ProviderResult<Response> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("{}: request timeout", what)
            } else if e.is_connect() {
                format!("{}: connection failed: {}", what, e)
            } else {
                format!("{}: request failed: {}", what, e)
            };
            ProviderError::network(message)
                .with_provider(PROVIDER)
                .with_source(e)
        })?;

        let status = response.status();
        trace!(status = status.as_u16(), what, "discord response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body).with_provider(PROVIDER));
        }
        Ok(response)
    }

    /// Sends a request, reads the body, then sleeps for the reset-after delay.
    async fn execute_rate_limited(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> ProviderResult<String> {
        let response = self.execute(request, what).await?;
        let wait = reset_after(response.headers())?;
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("{}: failed to read body: {}", what, e))
                .with_provider(PROVIDER)
                .with_source(e)
        })?;

        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, what, "waiting for rate-limit reset");
            tokio::time::sleep(wait).await;
        }
        Ok(body)
    }
}

/// Reads the reset-after delay from response headers.
///
/// Accepts integer and fractional seconds (`"1"`, `"0.25"`).
pub fn reset_after(headers: &HeaderMap) -> ProviderResult<Duration> {
    let missing = |detail: String| {
        ProviderError::rate_limit_signal_missing(detail).with_provider(PROVIDER)
    };

    let value = headers
        .get(RESET_AFTER_HEADER)
        .ok_or_else(|| missing("response has no X-RateLimit-Reset-After header".to_string()))?;
    let text = value
        .to_str()
        .map_err(|_| missing("X-RateLimit-Reset-After is not valid text".to_string()))?;
    let seconds: f64 = text.trim().parse().map_err(|_| {
        missing(format!("X-RateLimit-Reset-After is not a number: {:?}", text))
    })?;
    if seconds < 0.0 {
        return Err(missing(format!(
            "X-RateLimit-Reset-After is negative: {}",
            seconds
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| missing(format!("X-RateLimit-Reset-After out of range: {:?}", text)))
}

/// A scheduled event as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiScheduledEvent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_start_time: String,
    #[serde(default)]
    pub scheduled_end_time: Option<String>,
    #[serde(default)]
    pub entity_type: Option<u8>,
    #[serde(default)]
    pub privacy_level: Option<u8>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

impl ApiScheduledEvent {
    /// Converts to a [`PublishedEvent`].
    ///
    /// An event without an end time is treated as zero-length.
    pub fn into_published(self) -> ProviderResult<PublishedEvent> {
        let start = parse_timestamp(&self.scheduled_start_time).map_err(|e| {
            ProviderError::invalid_response(format!("event {}: {}", self.id, e))
                .with_provider(PROVIDER)
        })?;
        let end = match self.scheduled_end_time.as_deref() {
            Some(raw) => parse_timestamp(raw).map_err(|e| {
                ProviderError::invalid_response(format!("event {}: {}", self.id, e))
                    .with_provider(PROVIDER)
            })?,
            None => start,
        };

        Ok(PublishedEvent {
            id: self.id,
            title: self.name,
            description: self.description.unwrap_or_default(),
            start,
            end,
            entity_type: self.entity_type.and_then(EntityType::from_code),
            privacy_level: self.privacy_level.and_then(PrivacyLevel::from_code),
            channel_id: self.channel_id,
            guild_id: self.guild_id,
        })
    }
}

/// Body of a create-event request.
#[derive(Debug, Clone, Serialize)]
pub struct ApiCreateEvent {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub scheduled_start_time: String,
    pub scheduled_end_time: String,
    pub entity_type: u8,
    pub channel_id: String,
    pub privacy_level: u8,
}

impl From<&NewEvent> for ApiCreateEvent {
    fn from(event: &NewEvent) -> Self {
        Self {
            name: event.title.clone(),
            description: event.description.clone(),
            scheduled_start_time: format_canonical(&event.start),
            scheduled_end_time: format_canonical(&event.end),
            entity_type: event.entity_type.code(),
            channel_id: event.channel_id.clone(),
            privacy_level: event.privacy_level.code(),
        }
    }
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    content: &'a str,
}
