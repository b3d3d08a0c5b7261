//! TMDB (The Movie Database) search client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

use crate::error::TmdbError;
use crate::models::TmdbSearchResponse;

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const PLACEHOLDER_POSTER: &str = "/images/placeholder-poster.jpg";

/// Text search over a movie catalogue.
#[async_trait]
pub trait MovieSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<TmdbSearchResponse, TmdbError>;
}

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_token: String,
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_token: &str) -> Self {
        Self {
            api_token: api_token.to_string(),
            base_url: TMDB_BASE_URL.to_string(),
            language: "en-US".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct TmdbClient {
    http: Client,
    search_url: Url,
    api_token: String,
    language: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, TmdbError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| TmdbError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let search_url = Url::parse(&format!(
            "{}/search/movie",
            config.base_url.trim_end_matches('/')
        ))?;

        Ok(Self {
            http,
            search_url,
            api_token: config.api_token.clone(),
            language: config.language.clone(),
        })
    }

    fn url_for(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("include_adult", "false")
            .append_pair("language", &self.language)
            .append_pair("page", "1");
        url
    }
}

#[async_trait]
impl MovieSearch for TmdbClient {
    async fn search(&self, query: &str) -> Result<TmdbSearchResponse, TmdbError> {
        let url = self.url_for(query);
        log::debug!("TMDB search {:?} - URL: {}", query, url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| TmdbError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status(status));
        }

        response
            .json::<TmdbSearchResponse>()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }
}

/// Full poster URL for a TMDB poster path, or the local placeholder.
pub fn image_url(poster_path: Option<&str>) -> String {
    match poster_path {
        Some(path) if !path.is_empty() => format!("{}{}", TMDB_POSTER_BASE, path),
        _ => PLACEHOLDER_POSTER.to_string(),
    }
}
