//! Structured events emitted while serving movie requests.
//!
//! Components take an `Arc<dyn EventSink>` instead of logging directly, so the
//! binary can route events to `log` and tests can inspect them.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};
use parking_lot::Mutex;

use crate::aggregator::Stage;

const TARGET: &str = "pulseplay::movies";

#[derive(Debug, Clone, PartialEq)]
pub enum MovieEvent {
    RequestReceived {
        sport: String,
    },
    CacheHit {
        key: String,
    },
    CacheMiss {
        key: String,
    },
    KeywordSelected {
        sport: String,
        keyword: Option<String>,
    },
    StageCompleted {
        stage: Stage,
        query: String,
        results: usize,
    },
    StageFailed {
        stage: Stage,
        query: String,
        fatal: bool,
        error: String,
    },
    Merged {
        combined: usize,
    },
    Filtered {
        retained: usize,
        languages: BTreeMap<String, usize>,
    },
    Served {
        sport: String,
        total: usize,
        top: Vec<String>,
    },
    Failed {
        sport: String,
        error: String,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: MovieEvent);
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: MovieEvent) {
        match event {
            MovieEvent::RequestReceived { sport } => {
                info!(target: TARGET, "Request received - sport: {:?}", sport)
            }
            MovieEvent::CacheHit { key } => {
                info!(target: TARGET, "Using cached results for {:?}", key)
            }
            MovieEvent::CacheMiss { key } => {
                debug!(target: TARGET, "No cached results for {:?}", key)
            }
            MovieEvent::KeywordSelected { sport, keyword } => match keyword {
                Some(keyword) => info!(
                    target: TARGET,
                    "Selected additional keyword {:?} for sport {:?}", keyword, sport
                ),
                None => info!(target: TARGET, "No additional keyword for sport {:?}", sport),
            },
            MovieEvent::StageCompleted {
                stage,
                query,
                results,
            } => info!(
                target: TARGET,
                "{} search {:?} returned {} results", stage, query, results
            ),
            MovieEvent::StageFailed {
                stage,
                query,
                fatal: true,
                error,
            } => error!(target: TARGET, "{} search {:?} failed: {}", stage, query, error),
            MovieEvent::StageFailed {
                stage,
                query,
                fatal: false,
                error,
            } => warn!(
                target: TARGET,
                "{} search {:?} failed, continuing without it: {}", stage, query, error
            ),
            MovieEvent::Merged { combined } => {
                info!(target: TARGET, "Combined results before filtering: {}", combined)
            }
            MovieEvent::Filtered {
                retained,
                languages,
            } => info!(
                target: TARGET,
                "Results after language filtering: {} ({:?})", retained, languages
            ),
            MovieEvent::Served { sport, total, top } => {
                if top.is_empty() {
                    info!(target: TARGET, "No movies found for {:?}", sport)
                } else {
                    info!(
                        target: TARGET,
                        "Returning {} movies for {:?}, top: {}",
                        total,
                        sport,
                        top.join(", ")
                    )
                }
            }
            MovieEvent::Failed { sport, error } => {
                error!(target: TARGET, "Error fetching movies for {:?}: {}", sport, error)
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MovieEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<MovieEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: MovieEvent) {
        self.events.lock().push(event);
    }
}
