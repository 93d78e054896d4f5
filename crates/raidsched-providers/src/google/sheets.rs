//! [`ScheduleSource`] backed by a Google Sheets spreadsheet.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use raidsched_core::local_instant;

use super::config::SheetsConfig;
use super::http;
use super::rows::{MonthSheet, parse_rows, target_months};
use crate::error::ProviderResult;
use crate::provider::{BoxFuture, Schedule, ScheduleSource};

const PROVIDER: &str = "sheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads duties from the month sheets of a spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsSchedule {
    http_client: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsSchedule {
    /// Creates a source after validating `config`.
    pub fn new(config: SheetsConfig) -> ProviderResult<Self> {
        config.validate()?;
        let http_client = http::build_client(PROVIDER, config.timeout, &config.user_agent)?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.spreadsheet_id)
        )
    }

    /// Lists the titles of every sheet in the spreadsheet.
    pub async fn sheet_titles(&self) -> ProviderResult<Vec<String>> {
        let request = self
            .http_client
            .get(self.spreadsheet_url())
            .bearer_auth(&self.config.access_token)
            .query(&[("fields", "sheets.properties.title")]);
        let response = http::send(PROVIDER, request, "get spreadsheet").await?;
        let spreadsheet: SpreadsheetResponse =
            http::json(PROVIDER, response, "get spreadsheet").await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    /// Reads the configured range of one sheet.
    pub async fn sheet_rows(&self, title: &str) -> ProviderResult<Vec<Vec<Value>>> {
        let range = format!("{}!{}", title, self.config.range);
        let url = format!("{}/values/{}", self.spreadsheet_url(), urlencoding::encode(&range));
        let request = self
            .http_client
            .get(url)
            .bearer_auth(&self.config.access_token);
        let response = http::send(PROVIDER, request, "get sheet values").await?;
        let table: ValueRangeResponse = http::json(PROVIDER, response, "get sheet values").await?;
        Ok(table.values)
    }

    /// Fetches the schedule as seen at `now`.
    #[instrument(skip(self), fields(spreadsheet = %self.config.spreadsheet_id))]
    pub async fn fetch_at(&self, timezone: Tz, now: DateTime<Utc>) -> ProviderResult<Schedule> {
        let local_today = now.with_timezone(&timezone).date_naive();
        let today = local_instant(local_today, self.config.start_time, &timezone)?;

        let titles = self.sheet_titles().await?;
        let this_month = local_today.month();
        let months = target_months(local_today, &self.config);
        let (present, absent): (Vec<MonthSheet>, Vec<MonthSheet>) = months
            .into_iter()
            .partition(|month| titles.iter().any(|title| *title == month.title));

        let mut schedule = Schedule::new(Vec::new(), today);
        for month in &absent {
            if month.month == this_month {
                warn!(sheet = %month.title, "the sheet of this month doesn't exist");
                schedule = schedule.with_missing_period(month.title.clone());
            } else {
                debug!(sheet = %month.title, "next month's sheet doesn't exist yet");
            }
        }

        for month in &present {
            let rows = self.sheet_rows(&month.title).await?;
            let duties = parse_rows(&rows, month, &self.config, &timezone, &now)?;
            debug!(sheet = %month.title, rows = rows.len(), duties = duties.len(), "read sheet");
            schedule.duties.extend(duties);
        }

        info!(duties = schedule.duties.len(), "fetched schedule");
        Ok(schedule)
    }
}

impl ScheduleSource for SheetsSchedule {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch(&self, timezone: Tz) -> BoxFuture<'_, ProviderResult<Schedule>> {
        Box::pin(self.fetch_at(timezone, Utc::now()))
    }
}
