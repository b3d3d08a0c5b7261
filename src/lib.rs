//! Movies API for PulsePlay.
//!
//! `GET /api/movies?sport=<category>` searches TMDB several times for the
//! category, merges the results without duplicates, keeps titles in the
//! supported languages and returns them most popular first. Results are
//! memoised per category for the life of the process.

pub mod aggregator;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod service;
pub mod tmdb;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::PulsePlayClient;
pub use config::Config;
pub use error::{ApiError, ClientError, TmdbError};
pub use models::{MovieRecord, MoviesResponse};
pub use service::MovieService;
