//! Discord collaborators.
//!
//! Guild scheduled events serve as the event directory, and a text channel
//! receives the daily announcement. Both share one [`DiscordClient`].
//!
//! # Example
//!
//! ```ignore
//! use raidsched_providers::discord::{DiscordClient, DiscordConfig, DiscordEventDirectory};
//!
//! let config = DiscordConfig::new(token, guild_id, voice_channel_id);
//! let directory = DiscordEventDirectory::new(DiscordClient::new(config)?);
//! let events = directory.list().await?;
//! ```

mod client;
mod config;
mod directory;
mod notifier;

pub use client::{
    ApiCreateEvent, ApiScheduledEvent, DiscordClient, RESET_AFTER_HEADER, reset_after,
};
pub use config::DiscordConfig;
pub use directory::DiscordEventDirectory;
pub use notifier::{DiscordNotifier, render_message};
