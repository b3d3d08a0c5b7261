use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::aggregator::Stage;
use crate::models::ErrorBody;

/// Failure talking to the TMDB search endpoint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TmdbError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("TMDB responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{stage} search failed: {source}")]
    FatalStage {
        stage: Stage,
        #[source]
        source: TmdbError,
    },
}

/// Errors surfaced by the HTTP layer. The rendered messages are part of the
/// public contract and must not change.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sport parameter is required")]
    MissingSport,

    #[error("Failed to fetch movies from TMDB")]
    Upstream(#[from] AggregateError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingSport => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Errors returned by [`crate::client::PulsePlayClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with an error; carries its message.
    #[error("{0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body is not a movie list.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
