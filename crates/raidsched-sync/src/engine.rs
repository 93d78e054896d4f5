//! The reconciliation run.
//!
//! A run has three strictly sequential steps:
//!
//! 1. [`SyncEngine::prepare`]: fetch the schedule, list the directory and
//!    compute the [`ReconciliationPlan`]. Nothing is mutated.
//! 2. [`SyncEngine::apply`]: walk the plan in duty order, creating missing
//!    events and announcing today's, then delete every stale event.
//! 3. [`SyncEngine::export`]: re-list the directory and publish the calendar.
//!
//! The directory waits out its own rate limit inside each call, so the
//! engine simply awaits one call before issuing the next. Any collaborator
//! failure aborts the run where it stands. Whatever was already applied is
//! valid remote state, and the next run matches it by start key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use raidsched_core::{
    CALENDAR_CONTENT_TYPE, DutyAction, EventKey, NewEvent, PublishedEvent, ReconciliationPlan,
    build_export_records, render_calendar,
};
use raidsched_providers::{CalendarPublisher, EventDirectory, Notifier, Schedule, ScheduleSource};

use crate::config::SyncConfig;
use crate::error::{Phase, SyncError, SyncResult};

/// Inputs and plan of a run, before anything is applied.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// The fetched schedule.
    pub schedule: Schedule,
    /// The directory snapshot the plan was computed against.
    pub existing: Vec<PublishedEvent>,
    /// The plan.
    pub plan: ReconciliationPlan,
}

/// What [`SyncEngine::apply`] did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Events created, in creation order.
    pub created: Vec<PublishedEvent>,
    /// Number of duties that already had an event.
    pub kept: usize,
    /// Identifiers of deleted events.
    pub deleted: Vec<String>,
    /// Identifiers of announced events.
    pub announced: Vec<String>,
    /// Start keys deemed active this run, in duty order.
    pub active_keys: Vec<EventKey>,
}

/// What [`SyncEngine::export`] did.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Number of calendar entries.
    pub records: usize,
    /// Public location of the calendar.
    pub url: String,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub reconcile: ReconcileReport,
    pub export: ExportReport,
}

/// Drives one event directory towards a schedule.
pub struct SyncEngine<'a> {
    config: SyncConfig,
    directory: &'a dyn EventDirectory,
}

impl<'a> SyncEngine<'a> {
    /// Creates an engine after validating `config`.
    pub fn new(config: SyncConfig, directory: &'a dyn EventDirectory) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self { config, directory })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetches both sides and computes the plan.
    #[instrument(skip_all, fields(source = source.name(), directory = self.directory.name()))]
    pub async fn prepare(&self, source: &dyn ScheduleSource) -> SyncResult<PreparedRun> {
        let schedule = source
            .fetch(self.config.timezone)
            .await
            .map_err(SyncError::at(Phase::Fetch))?;
        for period in &schedule.missing_periods {
            warn!(period = %period, "schedule period is missing, continuing without it");
        }
        info!(
            duties = schedule.duties.len(),
            today = %EventKey::from_instant(&schedule.today),
            "fetched schedule"
        );

        let existing = self
            .directory
            .list()
            .await
            .map_err(SyncError::at(Phase::List))?;
        info!(events = existing.len(), "listed published events");

        let plan = ReconciliationPlan::compute(&schedule.duties, &existing, &schedule.today);
        info!(
            create = plan.to_create().count(),
            keep = plan.matched().count(),
            delete = plan.to_delete.len(),
            notify = plan.notify_count(),
            "computed plan"
        );

        Ok(PreparedRun {
            schedule,
            existing,
            plan,
        })
    }

    /// Executes `plan`: creates and announcements in duty order, then deletes.
    #[instrument(skip_all, fields(today = %plan.today))]
    pub async fn apply(
        &self,
        plan: &ReconciliationPlan,
        notifier: &dyn Notifier,
    ) -> SyncResult<ReconcileReport> {
        let mut report = ReconcileReport {
            active_keys: plan.active_keys(),
            ..Default::default()
        };

        for action in &plan.actions {
            match action {
                DutyAction::Keep { event, notify, .. } => {
                    debug!(event_id = %event.id, start = %event.key(), "already published");
                    report.kept += 1;
                    if *notify {
                        self.announce(notifier, event, &mut report).await?;
                    }
                }
                DutyAction::Create { duty, notify } => {
                    let payload = NewEvent::from_duty(duty, self.config.event_channel_id.as_str());
                    let created = self
                        .directory
                        .create(&payload)
                        .await
                        .map_err(SyncError::at(Phase::Create))?;
                    info!(
                        event_id = %created.id,
                        title = %duty.title,
                        start = %duty.key(),
                        "created event"
                    );
                    if *notify {
                        self.announce(notifier, &created, &mut report).await?;
                    }
                    report.created.push(created);
                }
            }
        }

        for event in &plan.to_delete {
            self.directory
                .delete(&event.id)
                .await
                .map_err(SyncError::at(Phase::Delete))?;
            info!(
                event_id = %event.id,
                title = %event.title,
                start = %event.key(),
                "deleted stale event"
            );
            report.deleted.push(event.id.clone());
        }

        info!(
            created = report.created.len(),
            kept = report.kept,
            deleted = report.deleted.len(),
            announced = report.announced.len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    async fn announce(
        &self,
        notifier: &dyn Notifier,
        event: &PublishedEvent,
        report: &mut ReconcileReport,
    ) -> SyncResult<()> {
        notifier
            .announce(event)
            .await
            .map_err(SyncError::at(Phase::Notify))?;
        info!(event_id = %event.id, title = %event.title, notifier = notifier.name(), "announced");
        report.announced.push(event.id.clone());
        Ok(())
    }

    /// Waits for the directory to reflect the mutations just made.
    pub async fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            debug!(delay_secs = self.config.settle_delay.as_secs_f64(), "settling");
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }

    /// Re-lists the directory, renders the calendar and publishes it.
    #[instrument(skip_all, fields(publisher = publisher.name()))]
    pub async fn export(
        &self,
        publisher: &dyn CalendarPublisher,
        generated_at: DateTime<Utc>,
    ) -> SyncResult<ExportReport> {
        let events = self
            .directory
            .list()
            .await
            .map_err(SyncError::at(Phase::Export))?;

        let options = self.config.export_options();
        let records = build_export_records(&events, &options);
        let document = render_calendar(&records, &options, generated_at);

        let url = publisher
            .publish(&document, CALENDAR_CONTENT_TYPE)
            .await
            .map_err(SyncError::at(Phase::Publish))?;
        info!(records = records.len(), url = %url, "published calendar");

        Ok(ExportReport {
            records: records.len(),
            url,
        })
    }

    /// Runs prepare, apply, settle and export.
    pub async fn run(
        &self,
        source: &dyn ScheduleSource,
        notifier: &dyn Notifier,
        publisher: &dyn CalendarPublisher,
    ) -> SyncResult<RunReport> {
        let prepared = self.prepare(source).await?;
        let reconcile = self.apply(&prepared.plan, notifier).await?;
        self.settle().await;
        let export = self.export(publisher, Utc::now()).await?;
        Ok(RunReport { reconcile, export })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::*;
    use chrono::Duration;
    use raidsched_core::{EntityType, PrivacyLevel, export_uid};
    use raidsched_providers::ProviderErrorCode;
    use std::collections::BTreeSet;

    fn config() -> SyncConfig {
        SyncConfig::new(chrono_tz::Asia::Tokyo, CHANNEL)
            .with_guild_id(GUILD)
            .with_calendar_tag("raid-feed")
    }

    async fn reconcile(
        directory: &FakeDirectory,
        notifier: &FakeNotifier,
        source: &FakeSource,
    ) -> SyncResult<ReconcileReport> {
        let engine = SyncEngine::new(config(), directory)?;
        let prepared = engine.prepare(source).await?;
        engine.apply(&prepared.plan, notifier).await
    }

    fn keys(events: &[PublishedEvent]) -> BTreeSet<EventKey> {
        events.iter().map(PublishedEvent::key).collect()
    }

    #[tokio::test]
    async fn new_duty_today_is_created_then_announced() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![], log.clone());
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t1());

        let report = reconcile(&directory, &notifier, &source).await.unwrap();

        let key = t1().format("%Y-%m-%dT%H:%M:%S+00:00").to_string();
        assert_eq!(
            calls(&log),
            vec![
                Call::List,
                Call::Create(key),
                Call::Announce("new-1".into()),
            ]
        );
        assert_eq!(report.created.len(), 1);
        let created = &report.created[0];
        assert_eq!(created.title, "Raid");
        assert_eq!(created.start, t1());
        assert_eq!(created.end, t1() + Duration::hours(2));
        assert_eq!(created.entity_type, Some(EntityType::Voice));
        assert_eq!(created.privacy_level, Some(PrivacyLevel::GuildOnly));
        assert_eq!(created.channel_id.as_deref(), Some(CHANNEL));
        assert!(report.deleted.is_empty());
        assert_eq!(report.announced, vec!["new-1".to_string()]);
    }

    #[tokio::test]
    async fn matched_duty_keeps_event_and_stale_one_is_deleted() {
        let log = new_log();
        let directory =
            FakeDirectory::new(vec![published("42", t1()), published("99", t2())], log.clone());
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t2() + Duration::days(1));

        let report = reconcile(&directory, &notifier, &source).await.unwrap();

        assert_eq!(calls(&log), vec![Call::List, Call::Delete("99".into())]);
        assert_eq!(report.kept, 1);
        assert!(report.created.is_empty());
        assert!(report.announced.is_empty());
        assert_eq!(report.deleted, vec!["99".to_string()]);
    }

    #[tokio::test]
    async fn matched_duty_today_is_announced_once() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![published("42", t1())], log.clone());
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1()), duty("Later", t2())], t1());

        let report = reconcile(&directory, &notifier, &source).await.unwrap();

        let announces: Vec<_> = calls(&log)
            .into_iter()
            .filter(|c| matches!(c, Call::Announce(_)))
            .collect();
        assert_eq!(announces, vec![Call::Announce("42".into())]);
        assert_eq!(report.created.len(), 1);
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let log = new_log();
        let directory = FakeDirectory::new(
            vec![published("old", t1() - Duration::days(3)), published("42", t2())],
            log.clone(),
        );
        let notifier = FakeNotifier::new(log.clone());
        let duties = vec![duty("A", t1()), duty("B", t2()), duty("C", t2() + Duration::days(1))];
        let source = FakeSource::new(duties.clone(), t1() - Duration::days(1));

        let first = reconcile(&directory, &notifier, &source).await.unwrap();
        assert_eq!(first.created.len(), 2);
        assert_eq!(first.deleted, vec!["old".to_string()]);

        let second = reconcile(&directory, &notifier, &source).await.unwrap();
        assert!(second.created.is_empty());
        assert!(second.deleted.is_empty());
        assert_eq!(second.kept, 3);

        // Coverage and no orphans.
        let remaining = directory.events();
        let duty_keys: BTreeSet<_> = duties.iter().map(|d| d.key()).collect();
        assert_eq!(keys(&remaining), duty_keys);
        assert_eq!(remaining.len(), duties.len());
    }

    #[tokio::test]
    async fn empty_schedule_deletes_everything() {
        let log = new_log();
        let directory =
            FakeDirectory::new(vec![published("1", t1()), published("2", t2())], log.clone());
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![], t1());

        let report = reconcile(&directory, &notifier, &source).await.unwrap();

        assert_eq!(report.deleted, vec!["1".to_string(), "2".to_string()]);
        assert!(directory.events().is_empty());
        assert!(report.active_keys.is_empty());
    }

    #[tokio::test]
    async fn create_failure_aborts_before_deletes() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![published("99", t2())], log.clone());
        directory.fail_on(CallKind::Create, ProviderErrorCode::RateLimitSignalMissing);
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t1());

        let err = reconcile(&directory, &notifier, &source).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.phase(), Some(Phase::Create));
        assert!(!calls(&log).iter().any(|c| matches!(c, Call::Delete(_) | Call::Announce(_))));
        assert_eq!(directory.events().len(), 1);
    }

    #[tokio::test]
    async fn notifier_failure_is_fatal() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![published("99", t2())], log.clone());
        let notifier = FakeNotifier::failing(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t1());

        let err = reconcile(&directory, &notifier, &source).await.unwrap_err();

        assert_eq!(err.phase(), Some(Phase::Notify));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!calls(&log).contains(&Call::Delete("99".into())));
    }

    #[tokio::test]
    async fn list_failure_is_fatal() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![], log.clone());
        directory.fail_on(CallKind::List, ProviderErrorCode::InvalidResponse);
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t1());

        let err = reconcile(&directory, &notifier, &source).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.phase(), Some(Phase::List));
    }

    #[tokio::test]
    async fn delete_failure_is_fatal() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![published("99", t2())], log.clone());
        directory.fail_on(CallKind::Delete, ProviderErrorCode::NetworkError);
        let notifier = FakeNotifier::new(log.clone());
        let source = FakeSource::new(vec![], t1());

        let err = reconcile(&directory, &notifier, &source).await.unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Delete));
    }

    #[tokio::test]
    async fn missing_period_is_not_fatal() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![], log.clone());
        let notifier = FakeNotifier::new(log.clone());
        let schedule = Schedule::new(vec![duty("Raid", t2())], t1()).with_missing_period("5月");
        let source = FakeSource::with_schedule(schedule);

        let report = reconcile(&directory, &notifier, &source).await.unwrap();
        assert_eq!(report.created.len(), 1);
    }

    #[tokio::test]
    async fn prepare_does_not_mutate() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![published("99", t2())], log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t1());

        let engine = SyncEngine::new(config(), &directory).unwrap();
        let prepared = engine.prepare(&source).await.unwrap();

        assert_eq!(calls(&log), vec![Call::List]);
        assert_eq!(prepared.existing.len(), 1);
        assert_eq!(prepared.plan.to_create().count(), 1);
        assert_eq!(prepared.plan.to_delete.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_settles_then_exports_final_state() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![published("99", t2())], log.clone());
        let notifier = FakeNotifier::new(log.clone());
        let publisher = FakePublisher::new(log.clone());
        let source = FakeSource::new(vec![duty("Raid", t1())], t1());

        let engine = SyncEngine::new(config(), &directory).unwrap();
        let started = tokio::time::Instant::now();
        let report = engine.run(&source, &notifier, &publisher).await.unwrap();

        assert!(started.elapsed() >= std::time::Duration::from_secs(10));
        let key = t1().format("%Y-%m-%dT%H:%M:%S+00:00").to_string();
        assert_eq!(
            calls(&log),
            vec![
                Call::List,
                Call::Create(key.clone()),
                Call::Announce("new-1".into()),
                Call::Delete("99".into()),
                Call::List,
                Call::Publish,
            ]
        );
        assert_eq!(report.export.records, 1);
        assert_eq!(report.export.url, "https://storage.example/raid.ics");

        let documents = publisher.documents();
        assert_eq!(documents.len(), 1);
        let (document, content_type) = &documents[0];
        assert_eq!(content_type, "text/calendar");
        assert!(document.contains("X-WR-CALNAME:raid-feed"));
        assert!(document.contains(&export_uid("Raid", &EventKey::from_instant(&t1()))));
        assert!(document.contains("https://discord.com/events/guild-1/new-1"));
        assert!(!document.contains("/99"));
    }

    #[tokio::test]
    async fn export_list_failure_is_fatal() {
        let log = new_log();
        let directory = FakeDirectory::new(vec![], log.clone());
        directory.fail_on(CallKind::List, ProviderErrorCode::ServerError);
        let publisher = FakePublisher::new(log.clone());

        let engine = SyncEngine::new(config(), &directory).unwrap();
        let err = engine.export(&publisher, Utc::now()).await.unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Export));
        assert!(publisher.documents().is_empty());
    }

    #[test]
    fn engine_rejects_invalid_config() {
        let directory = FakeDirectory::new(vec![], new_log());
        let config = SyncConfig::new(chrono_tz::UTC, "");
        assert!(SyncEngine::new(config, &directory).is_err());
    }

    #[test]
    fn report_serializes() {
        let report = ReconcileReport {
            kept: 1,
            deleted: vec!["99".into()],
            active_keys: vec![EventKey::from_instant(&t1())],
            ..Default::default()
        };
        insta::assert_json_snapshot!(report, @r###"
        {
          "created": [],
          "kept": 1,
          "deleted": [
            "99"
          ],
          "announced": [],
          "active_keys": [
            "2024-05-11T04:50:00+00:00"
          ]
        }
        "###);
    }
}
