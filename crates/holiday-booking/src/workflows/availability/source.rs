use super::AvailabilityError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;
use url::Url;

/// Anything that can hand back the raw availability export as text.
#[async_trait]
pub trait AvailabilitySource: Debug + Send + Sync {
    async fn fetch_csv(&self) -> Result<String, AvailabilityError>;
}

/// Public spreadsheet export read over an unauthenticated GET.
#[derive(Debug, Clone)]
pub struct HttpAvailabilitySource {
    client: reqwest::Client,
    url: Url,
}

impl HttpAvailabilitySource {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl AvailabilitySource for HttpAvailabilitySource {
    async fn fetch_csv(&self) -> Result<String, AvailabilityError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AvailabilityError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Local export, used by the CLI when working offline.
#[derive(Debug, Clone)]
pub struct FileAvailabilitySource {
    path: PathBuf,
}

impl FileAvailabilitySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AvailabilitySource for FileAvailabilitySource {
    async fn fetch_csv(&self) -> Result<String, AvailabilityError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Fixed export text.
#[derive(Debug, Clone, Default)]
pub struct StaticAvailabilitySource {
    csv: String,
}

impl StaticAvailabilitySource {
    pub fn new(csv: impl Into<String>) -> Self {
        Self { csv: csv.into() }
    }
}

#[async_trait]
impl AvailabilitySource for StaticAvailabilitySource {
    async fn fetch_csv(&self) -> Result<String, AvailabilityError> {
        Ok(self.csv.clone())
    }
}
