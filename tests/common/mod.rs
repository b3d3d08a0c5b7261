#![allow(dead_code)]

use std::sync::Arc;

use pulseplay_api::cache::{CategoryCache, InMemoryCategoryCache};
use pulseplay_api::events::RecordingSink;
use pulseplay_api::testing::FakeSearch;
use pulseplay_api::MovieService;

pub struct Harness {
    pub search: Arc<FakeSearch>,
    pub cache: Arc<InMemoryCategoryCache>,
    pub events: Arc<RecordingSink>,
    pub service: MovieService,
}

pub fn harness(search: FakeSearch) -> Harness {
    let search = Arc::new(search);
    let cache = Arc::new(InMemoryCategoryCache::new());
    let events = Arc::new(RecordingSink::default());
    let service = MovieService::new(
        search.clone(),
        cache.clone() as Arc<dyn CategoryCache>,
        events.clone(),
    );
    Harness {
        search,
        cache,
        events,
        service,
    }
}
