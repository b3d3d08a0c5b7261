use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single movie as returned by the TMDB search endpoint.
///
/// Only the fields the aggregation looks at are typed; everything else the
/// upstream sends is kept in `extra` and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// TMDB sends `null` for some fields it usually fills in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MovieRecord {
    pub fn new(id: u64, title: &str, original_language: &str, popularity: f64) -> Self {
        Self {
            id,
            title: title.to_string(),
            original_language: original_language.to_string(),
            popularity,
            release_date: None,
            poster_path: None,
            extra: Map::new(),
        }
    }

    /// Year part of `release_date`, if it is a well-formed `YYYY-MM-DD` date.
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }

    /// `Title (year, lang)`, as used in log summaries.
    pub fn summary(&self) -> String {
        let year = self
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!("\"{}\" ({}, {})", self.title, year, self.original_language)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<MovieRecord>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// Body of a successful `GET /api/movies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub results: Vec<MovieRecord>,
    pub total_results: usize,
}

impl MoviesResponse {
    pub fn new(results: Vec<MovieRecord>) -> Self {
        let total_results = results.len();
        Self {
            results,
            total_results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
