//! Dry-run planning.

use raidsched_core::{DutyAction, ReconciliationPlan};
use raidsched_sync::SyncEngine;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Fetches both sides and prints the plan without mutating anything.
pub async fn plan(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let sync_config = config.sync_config()?;
    let (_, directory) = super::discord(config)?;
    let source = super::source(config)?;

    let engine = SyncEngine::new(sync_config, &directory)?;
    let prepared = engine.prepare(&source).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&prepared.plan)
            .map_err(|e| ClientError::Render(e.to_string()))?;
        println!("{}", rendered);
    } else {
        for period in &prepared.schedule.missing_periods {
            println!("warning: sheet {} is missing", period);
        }
        print!("{}", render(&prepared.plan));
    }
    Ok(())
}

/// Renders a plan, one line per action.
pub fn render(plan: &ReconciliationPlan) -> String {
    let mut out = format!("today: {}\n", plan.today);

    for action in &plan.actions {
        let duty = action.duty();
        let marker = if action.notify() { " (announce)" } else { "" };
        let line = match action {
            DutyAction::Create { .. } => {
                format!("create  {}  {}{}\n", duty.key(), duty.title, marker)
            }
            DutyAction::Keep { event, .. } => format!(
                "keep    {}  {} [{}]{}\n",
                duty.key(),
                duty.title,
                event.id,
                marker
            ),
        };
        out.push_str(&line);
    }
    for event in &plan.to_delete {
        out.push_str(&format!(
            "delete  {}  {} [{}]\n",
            event.key(),
            event.title,
            event.id
        ));
    }

    if plan.is_settled() {
        out.push_str("nothing to change\n");
    }
    out
}
