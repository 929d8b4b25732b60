use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::SourceError;

const USER_AGENT: &str = concat!("streamflix/", env!("CARGO_PKG_VERSION"));

/// Downloads caption payloads.
///
/// `http(s)://` URLs go over the network; anything else is read as a local path.
pub struct SubtitleFetcher {
    client: Client,
}

impl SubtitleFetcher {
    pub fn new() -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            let path = url.strip_prefix("file://").unwrap_or(url);
            debug!(path, "Reading local caption file");
            return Ok(tokio::fs::read_to_string(path).await?);
        }

        debug!(url, "Fetching captions");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
