//! In-memory collaborators for engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;

use raidsched_core::{Duty, EntityType, NewEvent, PrivacyLevel, PublishedEvent};
use raidsched_providers::{
    BoxFuture, CalendarPublisher, EventDirectory, Notifier, ProviderError, ProviderErrorCode,
    ProviderResult, Schedule, ScheduleSource,
};

pub const GUILD: &str = "guild-1";
pub const CHANNEL: &str = "voice-1";

/// One observable collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(String),
    Delete(String),
    Announce(String),
    Publish,
}

/// Call log shared by every fake of a test.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}

/// 2024-05-10T21:50:00-07:00
pub fn t1() -> DateTime<Utc> {
    FixedOffset::west_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 10, 21, 50, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn t2() -> DateTime<Utc> {
    t1() + Duration::days(1)
}

pub fn duty(title: &str, start: DateTime<Utc>) -> Duty {
    Duty::new(title, "", start, start + Duration::hours(2)).unwrap()
}

pub fn published(id: &str, start: DateTime<Utc>) -> PublishedEvent {
    PublishedEvent {
        id: id.to_string(),
        title: "Raid".to_string(),
        description: String::new(),
        start,
        end: start + Duration::hours(2),
        entity_type: Some(EntityType::Voice),
        privacy_level: Some(PrivacyLevel::GuildOnly),
        channel_id: Some(CHANNEL.to_string()),
        guild_id: Some(GUILD.to_string()),
    }
}

pub struct FakeSource {
    schedule: Schedule,
}

impl FakeSource {
    pub fn new(duties: Vec<Duty>, today: DateTime<Utc>) -> Self {
        Self {
            schedule: Schedule::new(duties, today),
        }
    }

    pub fn with_schedule(schedule: Schedule) -> Self {
        Self { schedule }
    }
}

impl ScheduleSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn fetch(&self, _timezone: Tz) -> BoxFuture<'_, ProviderResult<Schedule>> {
        let schedule = self.schedule.clone();
        Box::pin(async move { Ok(schedule) })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    List,
    Create,
    Delete,
}

pub struct FakeDirectory {
    events: Mutex<Vec<PublishedEvent>>,
    log: CallLog,
    next_id: AtomicUsize,
    failure: Mutex<Option<(CallKind, ProviderErrorCode)>>,
}

impl FakeDirectory {
    pub fn new(events: Vec<PublishedEvent>, log: CallLog) -> Self {
        Self {
            events: Mutex::new(events),
            log,
            next_id: AtomicUsize::new(1),
            failure: Mutex::new(None),
        }
    }

    /// Makes every later call of `kind` fail with `code`.
    pub fn fail_on(&self, kind: CallKind, code: ProviderErrorCode) {
        *self.failure.lock().unwrap() = Some((kind, code));
    }

    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn check(&self, kind: CallKind) -> ProviderResult<()> {
        match *self.failure.lock().unwrap() {
            Some((failing, code)) if failing == kind => {
                Err(ProviderError::new(code, "injected failure").with_provider("fake"))
            }
            _ => Ok(()),
        }
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

impl EventDirectory for FakeDirectory {
    fn name(&self) -> &str {
        "fake"
    }

    fn list(&self) -> BoxFuture<'_, ProviderResult<Vec<PublishedEvent>>> {
        Box::pin(async move {
            self.record(Call::List);
            self.check(CallKind::List)?;
            Ok(self.events())
        })
    }

    fn create<'a>(&'a self, event: &'a NewEvent) -> BoxFuture<'a, ProviderResult<PublishedEvent>> {
        Box::pin(async move {
            self.record(Call::Create(event.key().to_string()));
            self.check(CallKind::Create)?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let created = PublishedEvent {
                id: format!("new-{}", id),
                title: event.title.clone(),
                description: event.description.clone(),
                start: event.start,
                end: event.end,
                entity_type: Some(event.entity_type),
                privacy_level: Some(event.privacy_level),
                channel_id: Some(event.channel_id.clone()),
                guild_id: Some(GUILD.to_string()),
            };
            self.events.lock().unwrap().push(created.clone());
            Ok(created)
        })
    }

    fn delete<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.record(Call::Delete(event_id.to_string()));
            self.check(CallKind::Delete)?;
            self.events.lock().unwrap().retain(|e| e.id != event_id);
            Ok(())
        })
    }
}

pub struct FakeNotifier {
    log: CallLog,
    fail: bool,
}

impl FakeNotifier {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true }
    }
}

impl Notifier for FakeNotifier {
    fn name(&self) -> &str {
        "fake"
    }

    fn announce<'a>(&'a self, event: &'a PublishedEvent) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(Call::Announce(event.id.clone()));
            if self.fail {
                return Err(ProviderError::server("HTTP 500").with_provider("fake"));
            }
            Ok(())
        })
    }
}

pub struct FakePublisher {
    log: CallLog,
    documents: Mutex<Vec<(String, String)>>,
}

impl FakePublisher {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            documents: Mutex::new(Vec::new()),
        }
    }

    /// Returns every `(document, content_type)` published so far.
    pub fn documents(&self) -> Vec<(String, String)> {
        self.documents.lock().unwrap().clone()
    }
}

impl CalendarPublisher for FakePublisher {
    fn name(&self) -> &str {
        "fake"
    }

    fn publish<'a>(
        &'a self,
        document: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(Call::Publish);
            self.documents
                .lock()
                .unwrap()
                .push((document.to_string(), content_type.to_string()));
            Ok("https://storage.example/raid.ics".to_string())
        })
    }
}
