//! [`EventDirectory`] backed by Discord guild scheduled events.

use tracing::{debug, instrument};

use raidsched_core::{NewEvent, PublishedEvent};

use super::client::{ApiCreateEvent, DiscordClient};
use crate::error::ProviderResult;
use crate::provider::{BoxFuture, EventDirectory};

/// Discord scheduled events of one guild.
#[derive(Debug, Clone)]
pub struct DiscordEventDirectory {
    client: DiscordClient,
}

impl DiscordEventDirectory {
    /// Wraps a client.
    pub fn new(client: DiscordClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self), fields(guild = %self.client.config().guild_id))]
    async fn list_impl(&self) -> ProviderResult<Vec<PublishedEvent>> {
        self.client
            .list_events()
            .await?
            .into_iter()
            .map(|event| event.into_published())
            .collect()
    }

    #[instrument(skip(self, event), fields(title = %event.title, start = %event.key()))]
    async fn create_impl(&self, event: &NewEvent) -> ProviderResult<PublishedEvent> {
        let created = self
            .client
            .create_event(&ApiCreateEvent::from(event))
            .await?
            .into_published()?;
        debug!(id = %created.id, "created scheduled event");
        Ok(created)
    }
}

impl EventDirectory for DiscordEventDirectory {
    fn name(&self) -> &str {
        "discord"
    }

    fn list(&self) -> BoxFuture<'_, ProviderResult<Vec<PublishedEvent>>> {
        Box::pin(self.list_impl())
    }

    fn create<'a>(&'a self, event: &'a NewEvent) -> BoxFuture<'a, ProviderResult<PublishedEvent>> {
        Box::pin(self.create_impl(event))
    }

    fn delete<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.client.delete_event(event_id))
    }
}
