//! Command implementations.

pub mod config;
pub mod export;
pub mod plan;
pub mod run;

use raidsched_providers::discord::{DiscordClient, DiscordEventDirectory, DiscordNotifier};
use raidsched_providers::google::{GcsPublisher, SheetsSchedule};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Builds the Discord directory and the client it shares with the notifier.
pub(crate) fn discord(config: &ClientConfig) -> ClientResult<(DiscordClient, DiscordEventDirectory)> {
    let client = DiscordClient::new(config.discord_config()?)?;
    let directory = DiscordEventDirectory::new(client.clone());
    Ok((client, directory))
}

/// Builds the announcement notifier.
pub(crate) fn notifier(client: DiscordClient) -> ClientResult<DiscordNotifier> {
    Ok(DiscordNotifier::new(client)?)
}

/// Builds the schedule source.
pub(crate) fn source(config: &ClientConfig) -> ClientResult<SheetsSchedule> {
    Ok(SheetsSchedule::new(config.sheets_config()?)?)
}

/// Builds the calendar publisher.
pub(crate) fn publisher(config: &ClientConfig) -> ClientResult<GcsPublisher> {
    Ok(GcsPublisher::new(config.storage_config()?)?)
}
