//! [`Notifier`] that posts a text message to a Discord channel.

use tracing::info;

use raidsched_core::{PublishedEvent, event_page_url};

use super::client::DiscordClient;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, Notifier};

/// Renders an announcement.
///
/// Placeholders: `{title}`, `{description}`, `{url}`. Substituted text is
/// never scanned again, and unknown placeholders are kept as written.
pub fn render_message(template: &str, event: &PublishedEvent, url: &str) -> String {
    let mut out = String::with_capacity(template.len() + event.title.len() + url.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let placeholder = tail.find('}').map(|close| &tail[..=close]);
        let value = match placeholder {
            Some("{title}") => Some(event.title.as_str()),
            Some("{description}") => Some(event.description.as_str()),
            Some("{url}") => Some(url),
            _ => None,
        };
        match (placeholder, value) {
            (Some(placeholder), Some(value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            _ => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Posts announcements to the configured notification channel.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: DiscordClient,
    channel_id: String,
}

impl DiscordNotifier {
    /// Creates a notifier. Fails if no notification channel is configured.
    pub fn new(client: DiscordClient) -> ProviderResult<Self> {
        let channel_id = client
            .config()
            .notification_channel_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::configuration("discord notification_channel_id is not set")
                    .with_provider("discord")
            })?;
        Ok(Self { client, channel_id })
    }

    /// Returns the message that would be posted for `event`.
    pub fn message_for(&self, event: &PublishedEvent) -> String {
        let url = event
            .page_url()
            .unwrap_or_else(|| event_page_url(&self.client.config().guild_id, &event.id));
        render_message(&self.client.config().message_template, event, &url)
    }

    async fn announce_impl(&self, event: &PublishedEvent) -> ProviderResult<()> {
        let content = self.message_for(event);
        self.client.post_message(&self.channel_id, &content).await?;
        info!(event_id = %event.id, channel = %self.channel_id, "announced today's event");
        Ok(())
    }
}

impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    fn announce<'a>(&'a self, event: &'a PublishedEvent) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.announce_impl(event))
    }
}
