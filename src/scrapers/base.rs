use crate::errors::FetchError;
use async_trait::async_trait;

/// Base trait for page fetchers
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the markup at `url`.
    ///
    /// A single attempt: no retries, non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
