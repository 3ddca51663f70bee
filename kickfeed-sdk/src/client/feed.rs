//! Football feed client.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{FeedMatch, LiveMatchesResponse, TimelineResponse};

/// Typed HTTP client for the public football feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    base_url: Url,
    language: String,
}

impl FeedClient {
    pub const DEFAULT_BASE_URL: &str = "https://api.fifa.com/api/v3/";

    /// Create a new `FeedClient`.
    ///
    /// * `base_url` – root of the feed API. A trailing slash is added when
    ///   missing so that relative joins keep the last path segment.
    /// * `language` – language code passed to every request (e.g. `en`).
    pub fn new(mut base_url: Url, language: impl Into<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
            language: language.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET live/football/now` – matches currently in play.
    pub async fn live_matches(&self) -> Result<Vec<FeedMatch>, ClientError> {
        let url = self.base_url.join("live/football/now")?;
        let response: LiveMatchesResponse = self.get(url).await?;
        Ok(response.results)
    }

    /// `GET timelines/{competition}/{season}/{stage}/{match}` – full event
    /// history of one match, in whatever order the feed returns it.
    pub async fn timeline(
        &self,
        competition_id: &str,
        season_id: &str,
        stage_id: &str,
        match_id: &str,
    ) -> Result<TimelineResponse, ClientError> {
        let url = self.base_url.join(&format!(
            "timelines/{competition_id}/{season_id}/{stage_id}/{match_id}"
        ))?;
        self.get(url).await
    }

    /// `GET live/football/{competition}/{season}/{stage}/{match}` – current
    /// state of one match, including the running score.
    pub async fn live_match(
        &self,
        competition_id: &str,
        season_id: &str,
        stage_id: &str,
        match_id: &str,
    ) -> Result<FeedMatch, ClientError> {
        let url = self.base_url.join(&format!(
            "live/football/{competition_id}/{season_id}/{stage_id}/{match_id}"
        ))?;
        self.get(url).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(url)
            .query(&[("language", self.language.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        parse_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = FeedClient::new(Url::parse("https://feed.example.com/api/v3").unwrap(), "en");
        let joined = client.base_url.join("live/football/now").unwrap();
        assert_eq!(joined.as_str(), "https://feed.example.com/api/v3/live/football/now");
    }
}
