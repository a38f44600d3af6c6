//! Dataset sources
//!
//! A dataset is read exactly once at startup, either from a local CSV file
//! or from a remote URL. Any failure here is fatal for the app that needs it.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::error::DatasetResult;
use super::table::Dataset;

/// Where a dataset's CSV text comes from
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Fetch the raw CSV text
    async fn fetch(&self) -> DatasetResult<String>;
}

/// CSV file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for LocalFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> DatasetResult<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// CSV served over HTTP(S)
#[derive(Debug, Clone)]
pub struct RemoteCsv {
    url: String,
    client: reqwest::Client,
}

impl RemoteCsv {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl DataSource for RemoteCsv {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> DatasetResult<String> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Pick a source for a location string: URLs are fetched, anything else is a path
pub fn source_for(location: &str, timeout: Duration) -> Box<dyn DataSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(RemoteCsv::new(location, timeout))
    } else {
        Box::new(LocalFile::new(location))
    }
}

/// Fetch and parse a dataset
pub async fn load(source: &dyn DataSource) -> DatasetResult<Arc<Dataset>> {
    let location = source.describe();
    tracing::info!(source = %location, "Loading dataset");

    let text = source.fetch().await?;
    let dataset = Dataset::from_csv_str(&text)?;

    tracing::info!(
        source = %location,
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Dataset loaded"
    );
    Ok(Arc::new(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetError;
    use std::io::Write;

    #[test]
    fn test_source_for_location() {
        let timeout = Duration::from_secs(5);
        assert_eq!(
            source_for("https://example.com/data.csv", timeout).describe(),
            "https://example.com/data.csv"
        );
        assert_eq!(source_for("./data.csv", timeout).describe(), "./data.csv");
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "state,total exports").unwrap();
        writeln!(file, "Alabama,1390.63").unwrap();
        writeln!(file, "Alaska,13.31").unwrap();

        let source = LocalFile::new(file.path());
        let data = load(&source).await.unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.columns(), &["state", "total exports"]);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalFile::new(dir.path().join("missing.csv"));

        assert!(matches!(load(&source).await, Err(DatasetError::Io(_))));
    }
}
