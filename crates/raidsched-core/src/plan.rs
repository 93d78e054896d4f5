//! The reconciliation plan.
//!
//! A plan joins the intended duties against the published events on their
//! [`EventKey`]. It is computed once per run, before any remote mutation, and
//! is a plain value so the join can be checked without a directory.
//!
//! Matching rules:
//!
//! - Duties are visited in source order. Each duty claims the first unclaimed
//!   published event with the same key. A claimed event is never matched
//!   twice, so a second duty with the same key becomes a create.
//! - Every published event left unclaimed is deleted. This includes surplus
//!   copies of an event whose key is still active, so after the plan is
//!   applied each active key has exactly one published event.
//! - The first duty whose key equals today's key is flagged for notification,
//!   whether it was matched or is about to be created. Later duties with the
//!   same key are not, so a run announces at most once.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duty::Duty;
use crate::event::PublishedEvent;
use crate::time::EventKey;

/// What to do for one duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DutyAction {
    /// The duty already has a published event; nothing to mutate.
    Keep {
        duty: Duty,
        event: PublishedEvent,
        notify: bool,
    },
    /// The duty has no published event and must be created.
    Create { duty: Duty, notify: bool },
}

impl DutyAction {
    /// Returns the duty this action is for.
    pub fn duty(&self) -> &Duty {
        match self {
            Self::Keep { duty, .. } | Self::Create { duty, .. } => duty,
        }
    }

    /// Returns whether this duty is announced today.
    pub fn notify(&self) -> bool {
        match self {
            Self::Keep { notify, .. } | Self::Create { notify, .. } => *notify,
        }
    }

    /// Returns true for a create action.
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create { .. })
    }
}

/// The diff between intended duties and published events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    /// Today's key; duties with this key are announced.
    pub today: EventKey,
    /// One action per duty, in duty order.
    pub actions: Vec<DutyAction>,
    /// Published events with no duty, in directory order.
    pub to_delete: Vec<PublishedEvent>,
}

impl ReconciliationPlan {
    /// Joins `duties` against `existing`.
    pub fn compute(duties: &[Duty], existing: &[PublishedEvent], today: &DateTime<Utc>) -> Self {
        let today = EventKey::from_instant(today);
        let existing_keys: Vec<EventKey> = existing.iter().map(PublishedEvent::key).collect();
        let mut claimed = vec![false; existing.len()];
        let mut announced = false;

        let actions = duties
            .iter()
            .map(|duty| {
                let key = duty.key();
                let notify = !announced && key == today;
                announced |= notify;
                let found = (0..existing.len()).find(|&i| !claimed[i] && existing_keys[i] == key);

                match found {
                    Some(i) => {
                        claimed[i] = true;
                        DutyAction::Keep {
                            duty: duty.clone(),
                            event: existing[i].clone(),
                            notify,
                        }
                    }
                    None => DutyAction::Create {
                        duty: duty.clone(),
                        notify,
                    },
                }
            })
            .collect();

        let to_delete = existing
            .iter()
            .zip(claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(event, _)| event.clone())
            .collect();

        Self {
            today,
            actions,
            to_delete,
        }
    }

    /// Duties that need a new published event.
    pub fn to_create(&self) -> impl Iterator<Item = &Duty> {
        self.actions.iter().filter_map(|action| match action {
            DutyAction::Create { duty, .. } => Some(duty),
            DutyAction::Keep { .. } => None,
        })
    }

    /// Duties paired with the published event they matched.
    pub fn matched(&self) -> impl Iterator<Item = (&Duty, &PublishedEvent)> {
        self.actions.iter().filter_map(|action| match action {
            DutyAction::Keep { duty, event, .. } => Some((duty, event)),
            DutyAction::Create { .. } => None,
        })
    }

    /// Keys deemed active this run, in duty order.
    pub fn active_keys(&self) -> Vec<EventKey> {
        self.actions.iter().map(|a| a.duty().key()).collect()
    }

    /// Number of announcements this plan will make.
    pub fn notify_count(&self) -> usize {
        self.actions.iter().filter(|a| a.notify()).count()
    }

    /// Returns true when executing the plan mutates nothing.
    pub fn is_settled(&self) -> bool {
        self.to_delete.is_empty() && !self.actions.iter().any(DutyAction::is_create)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EntityType, PrivacyLevel};
    use chrono::{Duration, FixedOffset, TimeZone};

    fn t1() -> DateTime<Utc> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 10, 21, 50, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn t2() -> DateTime<Utc> {
        t1() + Duration::days(1)
    }

    fn duty(title: &str, start: DateTime<Utc>) -> Duty {
        Duty::new(title, "", start, start + Duration::hours(2)).unwrap()
    }

    fn published(id: &str, start: DateTime<Utc>) -> PublishedEvent {
        PublishedEvent {
            id: id.to_string(),
            title: "Raid".to_string(),
            description: String::new(),
            start,
            end: start + Duration::hours(2),
            entity_type: Some(EntityType::Voice),
            privacy_level: Some(PrivacyLevel::GuildOnly),
            channel_id: Some("chan".to_string()),
            guild_id: Some("guild".to_string()),
        }
    }

    fn ids(events: &[PublishedEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn new_duty_is_created() {
        let duties = vec![duty("Raid", t1())];
        let plan = ReconciliationPlan::compute(&duties, &[], &t2());

        assert_eq!(plan.to_create().count(), 1);
        assert_eq!(plan.matched().count(), 0);
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.notify_count(), 0);
    }

    #[test]
    fn new_duty_today_is_created_and_announced() {
        let duties = vec![duty("Raid", t1())];
        let plan = ReconciliationPlan::compute(&duties, &[], &t1());

        assert!(matches!(
            plan.actions.as_slice(),
            [DutyAction::Create { notify: true, .. }]
        ));
    }

    #[test]
    fn matched_duty_keeps_event_and_stale_event_is_deleted() {
        let duties = vec![duty("Raid", t1())];
        let existing = vec![published("42", t1()), published("99", t2())];
        let plan = ReconciliationPlan::compute(&duties, &existing, &t2());

        assert_eq!(plan.to_create().count(), 0);
        let matched: Vec<_> = plan.matched().map(|(_, e)| e.id.as_str()).collect();
        assert_eq!(matched, vec!["42"]);
        assert_eq!(ids(&plan.to_delete), vec!["99"]);
        assert_eq!(plan.notify_count(), 0);
    }

    #[test]
    fn matched_duty_today_is_announced_once() {
        let duties = vec![duty("Raid", t1())];
        let existing = vec![published("42", t1())];
        let plan = ReconciliationPlan::compute(&duties, &existing, &t1());

        assert_eq!(plan.notify_count(), 1);
        assert!(plan.is_settled());
    }

    #[test]
    fn empty_schedule_deletes_everything() {
        let existing = vec![published("1", t1()), published("2", t2())];
        let plan = ReconciliationPlan::compute(&[], &existing, &t1());

        assert!(plan.actions.is_empty());
        assert_eq!(ids(&plan.to_delete), vec!["1", "2"]);
    }

    #[test]
    fn duplicate_duty_key_matches_first_and_creates_second() {
        let duties = vec![duty("First", t1()), duty("Second", t1())];
        let existing = vec![published("42", t1())];
        let plan = ReconciliationPlan::compute(&duties, &existing, &t2());

        assert!(matches!(&plan.actions[0], DutyAction::Keep { duty, .. } if duty.title == "First"));
        assert!(matches!(&plan.actions[1], DutyAction::Create { duty, .. } if duty.title == "Second"));
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn duplicate_duty_today_is_announced_once() {
        let duties = vec![duty("First", t1()), duty("Second", t1())];
        let plan = ReconciliationPlan::compute(&duties, &[], &t1());

        assert_eq!(plan.to_create().count(), 2);
        assert_eq!(plan.notify_count(), 1);
        assert!(plan.actions[0].notify());
    }

    #[test]
    fn duplicate_remote_events_keep_one() {
        let duties = vec![duty("Raid", t1())];
        let existing = vec![published("a", t1()), published("b", t1())];
        let plan = ReconciliationPlan::compute(&duties, &existing, &t2());

        let matched: Vec<_> = plan.matched().map(|(_, e)| e.id.as_str()).collect();
        assert_eq!(matched, vec!["a"]);
        assert_eq!(ids(&plan.to_delete), vec!["b"]);
    }

    #[test]
    fn plan_serializes_for_dry_run() {
        let duties = vec![duty("Raid", t1())];
        let existing = vec![published("99", t2())];
        let plan = ReconciliationPlan::compute(&duties, &existing, &t1());

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["actions"][0]["action"], "create");
        assert_eq!(value["actions"][0]["notify"], true);
        assert_eq!(value["to_delete"][0]["id"], "99");

        insta::assert_json_snapshot!(plan, @r###"
        {
          "today": "2024-05-11T04:50:00+00:00",
          "actions": [
            {
              "action": "create",
              "duty": {
                "title": "Raid",
                "description": "",
                "start": "2024-05-11T04:50:00Z",
                "end": "2024-05-11T06:50:00Z"
              },
              "notify": true
            }
          ],
          "to_delete": [
            {
              "id": "99",
              "title": "Raid",
              "description": "",
              "start": "2024-05-12T04:50:00Z",
              "end": "2024-05-12T06:50:00Z",
              "entity_type": "voice",
              "privacy_level": "guild_only",
              "channel_id": "chan",
              "guild_id": "guild"
            }
          ]
        }
        "###);
    }

    #[test]
    fn plan_partitions_inputs() {
        let duties = vec![duty("A", t1()), duty("B", t2()), duty("C", t2() + Duration::days(1))];
        let existing = vec![
            published("x", t2()),
            published("y", t1() - Duration::days(3)),
            published("z", t1()),
        ];
        let plan = ReconciliationPlan::compute(&duties, &existing, &t1());

        assert_eq!(plan.to_create().count() + plan.matched().count(), duties.len());
        assert_eq!(plan.to_delete.len() + plan.matched().count(), existing.len());
        for (duty, event) in plan.matched() {
            assert_eq!(duty.key(), event.key());
        }
        assert_eq!(plan.active_keys().len(), 3);
        assert_eq!(ids(&plan.to_delete), vec!["y"]);
    }

    #[test]
    fn recompute_after_applying_is_settled() {
        let duties = vec![duty("A", t1()), duty("B", t2())];
        let existing = vec![published("old", t1() - Duration::days(7))];
        let first = ReconciliationPlan::compute(&duties, &existing, &t1());
        assert!(!first.is_settled());

        // Apply: create every planned duty, drop every planned delete.
        let mut after: Vec<PublishedEvent> = first.matched().map(|(_, e)| e.clone()).collect();
        for (i, duty) in first.to_create().enumerate() {
            after.push(published(&format!("new-{}", i), duty.start));
        }

        let second = ReconciliationPlan::compute(&duties, &after, &t1());
        assert!(second.is_settled());
        assert_eq!(second.notify_count(), first.notify_count());
    }
}
