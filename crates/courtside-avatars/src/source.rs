// Remote headshot sources.

use std::time::Duration;

use async_trait::async_trait;
use courtside_core::config::{AvatarConfig, PLAYER_ID_PLACEHOLDER};
use tracing::debug;

use crate::error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Anything that can return image bytes for a player identifier.
///
/// Any failure, transport or status, means "unavailable"; the resolver does
/// not distinguish between them beyond logging.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, player_id: &str) -> Result<Vec<u8>, FetchError>;
}

/// Headshots served over HTTP from a URL template containing `{player_id}`.
pub struct HttpImageSource {
    http: reqwest::Client,
    url_template: String,
}

impl HttpImageSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            url_template: url_template.into(),
        })
    }

    pub fn from_config(config: &AvatarConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.url_template.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url_for(&self, player_id: &str) -> String {
        self.url_template.replace(PLAYER_ID_PLACEHOLDER, player_id)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, player_id: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(player_id);
        debug!(%url, "requesting headshot");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
