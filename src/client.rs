//! Client for the PulsePlay movies API, for front ends written in Rust.

use reqwest::Client;
use url::Url;

use crate::error::ClientError;
use crate::models::{ErrorBody, MoviesResponse};

#[derive(Clone)]
pub struct PulsePlayClient {
    http: Client,
    base_url: Url,
}

impl PulsePlayClient {
    /// `base_url` is where the API is mounted, e.g. `http://localhost:8080`.
    /// Requests go to `api/movies` relative to it, so a path prefix must end
    /// with a slash.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    /// Fetches the aggregated movie list for `sport`.
    ///
    /// Error responses are reported with the message the API sent, falling
    /// back to the HTTP reason phrase when the body is not an error payload.
    pub async fn fetch_movies_by_sport(&self, sport: &str) -> Result<MoviesResponse, ClientError> {
        let mut url = self.base_url.join("api/movies")?;
        url.query_pairs_mut().append_pair("sport", sport);

        let result = self.send(url).await;
        if let Err(err) = &result {
            log::error!("Error fetching movies: {}", err);
        }
        result
    }

    async fn send(&self, url: Url) -> Result<MoviesResponse, ClientError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!(
                    "Failed to fetch movies: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                ),
            };
            return Err(ClientError::Api(message));
        }

        response
            .json::<MoviesResponse>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}
