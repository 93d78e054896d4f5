//! Calendar-only export.

use chrono::Utc;
use raidsched_sync::SyncEngine;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Re-lists the published events and publishes the calendar.
pub async fn export(config: &ClientConfig) -> ClientResult<()> {
    let sync_config = config.sync_config()?;
    let (_, directory) = super::discord(config)?;
    let publisher = super::publisher(config)?;

    let engine = SyncEngine::new(sync_config, &directory)?;
    let report = engine.export(&publisher, Utc::now()).await?;
    println!("calendar: {} ({} events)", report.url, report.records);
    Ok(())
}
