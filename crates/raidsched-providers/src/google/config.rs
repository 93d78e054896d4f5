//! Google Sheets and Cloud Storage configuration.

use std::time::Duration;

use chrono::NaiveTime;

use crate::error::{ProviderError, ProviderResult};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder replaced by the month number in sheet titles.
pub const MONTH_PLACEHOLDER: &str = "{month}";

fn user_agent() -> String {
    format!("raidsched/{}", env!("CARGO_PKG_VERSION"))
}

fn require(provider: &str, field: &str, value: &str) -> ProviderResult<()> {
    if value.trim().is_empty() {
        return Err(
            ProviderError::configuration(format!("{} {} is empty", provider, field))
                .with_provider(provider.to_string()),
        );
    }
    Ok(())
}

fn require_http(provider: &str, field: &str, value: &str) -> ProviderResult<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ProviderError::configuration(format!(
            "{} {} must be an http(s) URL, got {:?}",
            provider, field, value
        ))
        .with_provider(provider.to_string()));
    }
    Ok(())
}

/// Where the schedule spreadsheet lives and how its rows are laid out.
#[derive(Clone)]
pub struct SheetsConfig {
    /// Spreadsheet identifier.
    pub spreadsheet_id: String,
    /// OAuth bearer token with read access to the spreadsheet.
    pub access_token: String,
    /// API base URL.
    pub api_base: String,
    /// A1 range read from each month sheet.
    pub range: String,
    /// Sheet title pattern, `{month}` is replaced by the month number.
    pub sheet_title_format: String,
    /// Local start time of every duty.
    pub start_time: NaiveTime,
    /// Local end time of every duty.
    pub end_time: NaiveTime,
    /// Title used when the title cell is blank.
    pub default_title: String,
    /// Activity cell value that marks a row as a duty.
    pub active_marker: String,
    /// Prefix put in front of a non-empty notice.
    pub notice_prefix: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("range", &self.range)
            .field("sheet_title_format", &self.sheet_title_format)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .finish_non_exhaustive()
    }
}

impl SheetsConfig {
    /// Default API base.
    pub const DEFAULT_API_BASE: &'static str = "https://sheets.googleapis.com";
    /// Default range.
    pub const DEFAULT_RANGE: &'static str = "A4:M100";
    /// Default sheet title pattern.
    pub const DEFAULT_SHEET_TITLE_FORMAT: &'static str = "{month}月";
    /// Default title.
    pub const DEFAULT_TITLE: &'static str = "活動";
    /// Default activity marker.
    pub const DEFAULT_ACTIVE_MARKER: &'static str = "有り";
    /// Default notice prefix.
    pub const DEFAULT_NOTICE_PREFIX: &'static str = "特記事項: ";

    /// Default local start time (21:50).
    pub fn default_start_time() -> NaiveTime {
        NaiveTime::from_hms_opt(21, 50, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Default local end time (23:50).
    pub fn default_end_time() -> NaiveTime {
        NaiveTime::from_hms_opt(23, 50, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Creates a configuration with the default row layout.
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            range: Self::DEFAULT_RANGE.to_string(),
            sheet_title_format: Self::DEFAULT_SHEET_TITLE_FORMAT.to_string(),
            start_time: Self::default_start_time(),
            end_time: Self::default_end_time(),
            default_title: Self::DEFAULT_TITLE.to_string(),
            active_marker: Self::DEFAULT_ACTIVE_MARKER.to_string(),
            notice_prefix: Self::DEFAULT_NOTICE_PREFIX.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: user_agent(),
        }
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the range read from each sheet.
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Sets the sheet title pattern.
    pub fn with_sheet_title_format(mut self, format: impl Into<String>) -> Self {
        self.sheet_title_format = format.into();
        self
    }

    /// Sets the local start and end times of a duty.
    pub fn with_hours(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Sets the default title.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Sets the activity marker.
    pub fn with_active_marker(mut self, marker: impl Into<String>) -> Self {
        self.active_marker = marker.into();
        self
    }

    /// Sets the notice prefix.
    pub fn with_notice_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.notice_prefix = prefix.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the sheet title for a month (1-12).
    pub fn sheet_title(&self, month: u32) -> String {
        self.sheet_title_format
            .replace(MONTH_PLACEHOLDER, &month.to_string())
    }

    /// Checks required values and the row layout.
    pub fn validate(&self) -> ProviderResult<()> {
        require("sheets", "spreadsheet_id", &self.spreadsheet_id)?;
        require("sheets", "access_token", &self.access_token)?;
        require("sheets", "range", &self.range)?;
        require("sheets", "default_title", &self.default_title)?;
        require("sheets", "active_marker", &self.active_marker)?;
        require_http("sheets", "api_base", &self.api_base)?;
        if !self.sheet_title_format.contains(MONTH_PLACEHOLDER) {
            return Err(ProviderError::configuration(format!(
                "sheets sheet_title_format must contain {}, got {:?}",
                MONTH_PLACEHOLDER, self.sheet_title_format
            ))
            .with_provider("sheets"));
        }
        if self.end_time < self.start_time {
            return Err(ProviderError::configuration(format!(
                "sheets end_time {} is before start_time {}",
                self.end_time, self.start_time
            ))
            .with_provider("sheets"));
        }
        Ok(())
    }
}

/// Where the exported calendar is stored.
#[derive(Clone)]
pub struct StorageConfig {
    /// Bucket name.
    pub bucket: String,
    /// Object path inside the bucket.
    pub object_path: String,
    /// OAuth bearer token with write access to the bucket.
    pub access_token: String,
    /// Base URL of the upload API.
    pub upload_base: String,
    /// Base URL under which objects are publicly served.
    pub public_base: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("object_path", &self.object_path)
            .field("access_token", &"<redacted>")
            .field("upload_base", &self.upload_base)
            .field("public_base", &self.public_base)
            .finish_non_exhaustive()
    }
}

impl StorageConfig {
    /// Default upload and public base.
    pub const DEFAULT_BASE: &'static str = "https://storage.googleapis.com";

    /// Creates a configuration for one object.
    pub fn new(
        bucket: impl Into<String>,
        object_path: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object_path: object_path.into(),
            access_token: access_token.into(),
            upload_base: Self::DEFAULT_BASE.to_string(),
            public_base: Self::DEFAULT_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: user_agent(),
        }
    }

    /// Sets the upload API base URL.
    pub fn with_upload_base(mut self, base: impl Into<String>) -> Self {
        self.upload_base = base.into();
        self
    }

    /// Sets the public base URL.
    pub fn with_public_base(mut self, base: impl Into<String>) -> Self {
        self.public_base = base.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the public URL of the object.
    pub fn public_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            self.bucket,
            self.object_path.trim_start_matches('/')
        )
    }

    /// Checks required values.
    pub fn validate(&self) -> ProviderResult<()> {
        require("storage", "bucket", &self.bucket)?;
        require("storage", "path", &self.object_path)?;
        require("storage", "access_token", &self.access_token)?;
        require_http("storage", "upload_base", &self.upload_base)?;
        require_http("storage", "public_base", &self.public_base)?;
        Ok(())
    }
}
