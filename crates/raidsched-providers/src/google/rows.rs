//! Turning month sheets into duties.
//!
//! Each sheet holds one month. A row is one day:
//!
//! | column | content |
//! |--------|---------|
//! | 0 | title, blank means the default title |
//! | 1 | date as `M/D`, only the day is used |
//! | 3 | activity marker |
//! | 12 | notice |

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use raidsched_core::{Duty, local_instant};

use super::config::SheetsConfig;
use crate::error::{ProviderError, ProviderResult};

const TITLE_COLUMN: usize = 0;
const DATE_COLUMN: usize = 1;
const ACTIVE_COLUMN: usize = 3;
const NOTICE_COLUMN: usize = 12;

/// One month sheet the source looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSheet {
    /// Calendar year of the month.
    pub year: i32,
    /// Month number, 1-12.
    pub month: u32,
    /// Expected sheet title.
    pub title: String,
}

/// Returns this month's and next month's sheets for a local date.
///
/// Next month is the month containing the first of this month plus 32 days.
pub fn target_months(today: NaiveDate, config: &SheetsConfig) -> Vec<MonthSheet> {
    let first = today.with_day(1).unwrap_or(today);
    let next = first.checked_add_days(Days::new(32)).unwrap_or(first);

    [first, next]
        .into_iter()
        .map(|date| MonthSheet {
            year: date.year(),
            month: date.month(),
            title: config.sheet_title(date.month()),
        })
        .collect()
}

fn cell_text(row: &[Value], column: usize) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_day(text: &str) -> Option<u32> {
    text.split('/').nth(1)?.trim().parse().ok()
}

/// Parses the rows of one month sheet into duties starting after `now`.
///
/// Rows without a date are skipped. A date that is present but unreadable
/// fails the whole sheet, whether or not the row is active.
pub fn parse_rows(
    rows: &[Vec<Value>],
    sheet: &MonthSheet,
    config: &SheetsConfig,
    timezone: &Tz,
    now: &DateTime<Utc>,
) -> ProviderResult<Vec<Duty>> {
    let mut duties = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let date_text = cell_text(row, DATE_COLUMN);
        if date_text.trim().is_empty() {
            continue;
        }

        let malformed = |reason: &str| {
            ProviderError::data(format!(
                "sheet {} row {}: {} ({:?})",
                sheet.title,
                index + 1,
                reason,
                date_text
            ))
            .with_provider("sheets")
        };
        let day = parse_day(&date_text).ok_or_else(|| malformed("date is not M/D"))?;
        let date = NaiveDate::from_ymd_opt(sheet.year, sheet.month, day)
            .ok_or_else(|| malformed("day does not exist in this month"))?;

        if cell_text(row, ACTIVE_COLUMN).trim() != config.active_marker {
            continue;
        }

        let start = local_instant(date, config.start_time, timezone)?;
        if start <= *now {
            continue;
        }
        let end = local_instant(date, config.end_time, timezone)?;

        let title = cell_text(row, TITLE_COLUMN);
        let title = if title.trim().is_empty() {
            config.default_title.clone()
        } else {
            title
        };
        let notice = cell_text(row, NOTICE_COLUMN);
        let description = if notice.trim().is_empty() {
            String::new()
        } else {
            format!("{}{}", config.notice_prefix, notice)
        };

        duties.push(Duty::new(title, description, start, end)?);
    }

    Ok(duties)
}
