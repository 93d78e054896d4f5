//! Intended events read from the schedule source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::time::{EventKey, format_canonical};

/// An intended event.
///
/// Duties are produced fresh on every run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
    /// Event title (never empty).
    pub title: String,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant, not before `start`.
    pub end: DateTime<Utc>,
}

impl Duty {
    /// Creates a duty, rejecting ranges that end before they start.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvertedRange {
                start: format_canonical(&start),
                end: format_canonical(&end),
            });
        }
        Ok(Self {
            title: title.into(),
            description: description.into(),
            start,
            end,
        })
    }

    /// Returns the join key of this duty.
    pub fn key(&self) -> EventKey {
        EventKey::from_instant(&self.start)
    }
}
