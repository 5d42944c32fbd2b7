// HTTP client for the league player-stats endpoint.

use std::time::Duration;

use courtside_core::config::ScrapeConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, ORIGIN, PRAGMA, REFERER};
use serde_json::Value;
use tracing::info;

use crate::error::StatsError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// The stats endpoint rejects requests that don't look like they come from
/// the stats website itself.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Query parameters for a full-season, league-wide player dashboard.
pub fn query_params(config: &ScrapeConfig) -> Vec<(&'static str, String)> {
    let fixed = [
        ("MeasureType", "Base"),
        ("PlusMinus", "N"),
        ("PaceAdjust", "N"),
        ("Rank", "N"),
        ("LeagueID", "00"),
        ("PORound", "0"),
        ("Outcome", ""),
        ("Location", ""),
        ("Month", "0"),
        ("SeasonSegment", ""),
        ("DateFrom", ""),
        ("DateTo", ""),
        ("OpponentTeamID", "0"),
        ("VsConference", ""),
        ("VsDivision", ""),
        ("GameSegment", ""),
        ("Period", "0"),
        ("LastNGames", "0"),
        ("PlayerExperience", ""),
        ("PlayerPosition", ""),
        ("StarterBench", ""),
        ("TeamID", "0"),
        ("GameScope", ""),
        ("PlayerID", "0"),
    ];
    let mut params: Vec<(&'static str, String)> = vec![
        ("PerMode", config.per_mode.clone()),
        ("Season", config.season.clone()),
        ("SeasonType", config.season_type.clone()),
    ];
    params.extend(fixed.iter().map(|(k, v)| (*k, (*v).to_string())));
    params
}

pub struct StatsClient {
    http: reqwest::Client,
    config: ScrapeConfig,
}

impl StatsClient {
    pub fn from_config(config: &ScrapeConfig) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Fetch the raw JSON document for the configured season.
    pub async fn fetch_season(&self) -> Result<Value, StatsError> {
        info!(
            "Fetching {} {} player totals from {}",
            self.config.season, self.config.season_type, self.config.api_url
        );
        let response = self
            .http
            .get(&self.config.api_url)
            .query(&query_params(&self.config))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrape_config() -> ScrapeConfig {
        ScrapeConfig {
            api_url: "https://stats.example.com/leaguedashplayerstats".into(),
            season: "2023-24".into(),
            season_type: "Playoffs".into(),
            per_mode: "Totals".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn params_carry_configured_season() {
        let params = query_params(&scrape_config());
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("Season"), Some("2023-24"));
        assert_eq!(get("SeasonType"), Some("Playoffs"));
        assert_eq!(get("PerMode"), Some("Totals"));
        assert_eq!(get("MeasureType"), Some("Base"));
        assert_eq!(get("LeagueID"), Some("00"));
        assert_eq!(get("Outcome"), Some(""));
    }

    #[test]
    fn params_have_no_duplicate_keys() {
        let params = query_params(&scrape_config());
        let mut keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn client_builds_from_config() {
        assert!(StatsClient::from_config(&scrape_config()).is_ok());
    }
}
