use crate::config::Config;
use crate::errors::{FetchError, FundsError, Result};
use crate::scrapers::base::PageFetcher;
use crate::util::normalize_url;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};

/// Fetches pages over HTTP with a shared client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FundsError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

fn network_error(url: &str, e: reqwest::Error) -> FetchError {
    let cause = if e.is_timeout() {
        format!("timed out: {}", e)
    } else {
        e.to_string()
    };
    FetchError::Network {
        url: url.to_string(),
        cause,
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let target = normalize_url(url)?;
        debug!("GET {}", target);

        let response = self.client
            .get(target.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "he-IL,he;q=0.9,en-US;q=0.8")
            .send()
            .await
            .map_err(|e| network_error(target.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned HTTP {}", target, status);
            return Err(FetchError::UpstreamHttp {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| network_error(target.as_str(), e))?;
        debug!("Received {} bytes from {}", text.len(), target);

        Ok(text)
    }
}
