use std::sync::Arc;

use crate::aggregator::MovieAggregator;
use crate::cache::{
    cache_key, CachedMovies, CategoryCache, DisabledCategoryCache, InMemoryCategoryCache,
};
use crate::config::Config;
use crate::error::{ApiError, TmdbError};
use crate::events::{EventSink, LogSink, MovieEvent};
use crate::tmdb::{MovieSearch, TmdbClient};

const SUMMARY_LEN: usize = 5;

/// Serves movie lists per sport, in front of the category cache.
pub struct MovieService {
    aggregator: MovieAggregator,
    cache: Arc<dyn CategoryCache>,
    events: Arc<dyn EventSink>,
}

impl MovieService {
    pub fn new(
        search: Arc<dyn MovieSearch>,
        cache: Arc<dyn CategoryCache>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            aggregator: MovieAggregator::new(search, events.clone()),
            cache,
            events,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, TmdbError> {
        let search = Arc::new(TmdbClient::new(&config.tmdb)?);
        let cache: Arc<dyn CategoryCache> = if config.cache_enabled {
            Arc::new(InMemoryCategoryCache::new())
        } else {
            Arc::new(DisabledCategoryCache::default())
        };
        Ok(Self::new(search, cache, Arc::new(LogSink)))
    }

    pub fn cache(&self) -> &dyn CategoryCache {
        self.cache.as_ref()
    }

    pub async fn movies_for_sport(&self, sport: &str) -> Result<CachedMovies, ApiError> {
        if sport.trim().is_empty() {
            return Err(ApiError::MissingSport);
        }
        self.events.emit(MovieEvent::RequestReceived {
            sport: sport.to_string(),
        });

        let key = cache_key(sport);
        let movies = match self.cache.get(&key) {
            Some(cached) => {
                self.events.emit(MovieEvent::CacheHit { key });
                cached
            }
            None => {
                self.events.emit(MovieEvent::CacheMiss { key: key.clone() });
                let aggregation = self.aggregator.aggregate(sport).await.map_err(|err| {
                    self.events.emit(MovieEvent::Failed {
                        sport: sport.to_string(),
                        error: err.to_string(),
                    });
                    err
                })?;
                let movies = Arc::new(aggregation.movies);
                self.cache.put(&key, movies.clone());
                movies
            }
        };

        self.events.emit(MovieEvent::Served {
            sport: sport.to_string(),
            total: movies.len(),
            top: movies.iter().take(SUMMARY_LEN).map(|m| m.summary()).collect(),
        });
        Ok(movies)
    }
}
