//! [`CalendarPublisher`] that uploads to a Google Cloud Storage bucket.

use tracing::info;

use super::config::StorageConfig;
use super::http;
use crate::error::ProviderResult;
use crate::provider::{BoxFuture, CalendarPublisher};

const PROVIDER: &str = "storage";

/// Uploads the calendar as a single object, replacing any previous version.
#[derive(Debug, Clone)]
pub struct GcsPublisher {
    http_client: reqwest::Client,
    config: StorageConfig,
}

impl GcsPublisher {
    /// Creates a publisher after validating `config`.
    pub fn new(config: StorageConfig) -> ProviderResult<Self> {
        config.validate()?;
        let http_client = http::build_client(PROVIDER, config.timeout, &config.user_agent)?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.config.upload_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.bucket)
        )
    }

    async fn publish_impl(&self, document: &str, content_type: &str) -> ProviderResult<String> {
        let object = self.config.object_path.trim_start_matches('/');
        let request = self
            .http_client
            .post(self.upload_url())
            .bearer_auth(&self.config.access_token)
            .query(&[("uploadType", "media"), ("name", object)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(document.to_string());
        http::send(PROVIDER, request, "upload calendar").await?;

        let url = self.config.public_url();
        info!(bucket = %self.config.bucket, object, bytes = document.len(), "uploaded calendar");
        Ok(url)
    }
}

impl CalendarPublisher for GcsPublisher {
    fn name(&self) -> &str {
        "gcs"
    }

    fn publish<'a>(
        &'a self,
        document: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.publish_impl(document, content_type))
    }
}
