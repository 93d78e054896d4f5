//! Full reconciliation run.

use raidsched_sync::{RunReport, SyncEngine};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Reconciles, announces, prunes and exports.
///
/// Every collaborator is built before the first remote call, so a
/// configuration problem never leaves a half-applied run behind.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let sync_config = config.sync_config()?;
    let (client, directory) = super::discord(config)?;
    let notifier = super::notifier(client)?;
    let source = super::source(config)?;
    let publisher = super::publisher(config)?;

    let engine = SyncEngine::new(sync_config, &directory)?;
    info!("starting run");
    let report = engine.run(&source, &notifier, &publisher).await?;
    print!("{}", summary(&report));
    Ok(())
}

/// One-screen summary of a run.
pub fn summary(report: &RunReport) -> String {
    let reconcile = &report.reconcile;
    format!(
        "created {}, kept {}, deleted {}, announced {}\ncalendar: {} ({} events)\n",
        reconcile.created.len(),
        reconcile.kept,
        reconcile.deleted.len(),
        reconcile.announced.len(),
        report.export.url,
        report.export.records,
    )
}
