use std::{future::Future, time::Duration};

use crate::error::FetchError;

/// Where source images come from.
///
/// Implementations must bound how long a fetch can take.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, reference: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Fetches `http(s)://` references with reqwest and reads `file://` URLs or
/// bare paths from disk.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn read_local(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        tokio::fs::read(path).await.map_err(|source| FetchError::Io {
            path: path.to_string(),
            source,
        })
    }
}

impl ImageSource for ImageFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        let reference = reference.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            tracing::debug!(url = reference, "fetching remote image");
            self.fetch_remote(reference).await
        } else if let Some(path) = reference.strip_prefix("file://") {
            self.read_local(path).await
        } else if reference.is_empty() || reference.contains("://") {
            Err(FetchError::UnsupportedReference(reference.to_string()))
        } else {
            self.read_local(reference).await
        }
    }
}
