//! In-memory stand-ins for the TMDB search backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TmdbError;
use crate::models::{MovieRecord, TmdbSearchResponse};
use crate::tmdb::MovieSearch;

pub fn movie(id: u64, lang: &str, popularity: f64) -> MovieRecord {
    MovieRecord::new(id, &format!("Movie {}", id), lang, popularity)
}

/// Canned search backend. Unknown queries return no results.
#[derive(Default)]
pub struct FakeSearch {
    responses: HashMap<String, Result<Vec<MovieRecord>, TmdbError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with(mut self, query: &str, movies: Vec<MovieRecord>) -> Self {
        self.responses.insert(query.to_string(), Ok(movies));
        self
    }

    pub fn failing(mut self, query: &str, error: TmdbError) -> Self {
        self.responses.insert(query.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MovieSearch for FakeSearch {
    async fn search(&self, query: &str) -> Result<TmdbSearchResponse, TmdbError> {
        self.calls.lock().push(query.to_string());
        match self.responses.get(query) {
            Some(Ok(movies)) => Ok(TmdbSearchResponse {
                total_results: Some(movies.len() as u64),
                results: movies.clone(),
            }),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(TmdbSearchResponse::default()),
        }
    }
}
