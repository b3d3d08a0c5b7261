//! Builds the movie list for one sport category out of several TMDB searches.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::error::{AggregateError, TmdbError};
use crate::events::{EventSink, MovieEvent};
use crate::models::MovieRecord;
use crate::tmdb::MovieSearch;

pub const ALLOWED_LANGUAGES: [&str; 5] = ["en", "es", "de", "fr", "it"];

lazy_static! {
    static ref SPORT_KEYWORDS: HashMap<&'static str, &'static str> = HashMap::from([
        ("basketball", "NBA"),
        ("football", "NFL"),
        ("soccer", "FIFA"),
        ("combat", "UFC"),
        ("esports", "league of legends"),
        ("tennis", "wimbledon"),
        ("golf", "PGA"),
        ("olympics", "olympic games"),
    ]);
}

/// Extra search term for well-known sports, matched case-insensitively.
pub fn keyword_for(sport: &str) -> Option<&'static str> {
    SPORT_KEYWORDS.get(sport.to_lowercase().as_str()).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Documentary,
    Sport,
    Keyword,
    Broad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole aggregation.
    Fatal,
    /// Continue with an empty contribution when upstream answers with an
    /// error status. Transport and decoding failures still abort.
    BestEffort,
}

impl FailurePolicy {
    pub fn is_fatal(&self, err: &TmdbError) -> bool {
        match self {
            FailurePolicy::Fatal => true,
            FailurePolicy::BestEffort => !matches!(err, TmdbError::Status(_)),
        }
    }
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Documentary => "documentary",
            Stage::Sport => "sport",
            Stage::Keyword => "keyword",
            Stage::Broad => "broad",
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        match self {
            Stage::Documentary | Stage::Sport => FailurePolicy::Fatal,
            Stage::Keyword | Stage::Broad => FailurePolicy::BestEffort,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStep {
    pub stage: Stage,
    pub query: String,
}

/// The ordered searches issued for `sport`.
pub fn plan(sport: &str) -> Vec<SearchStep> {
    let mut steps = vec![
        SearchStep {
            stage: Stage::Documentary,
            query: format!("{} documentary", sport),
        },
        SearchStep {
            stage: Stage::Sport,
            query: sport.to_string(),
        },
    ];

    if let Some(keyword) = keyword_for(sport) {
        steps.push(SearchStep {
            stage: Stage::Keyword,
            query: keyword.to_string(),
        });
    }

    steps.push(SearchStep {
        stage: Stage::Broad,
        query: format!("{} movie", sport),
    });
    steps
}

/// Concatenates batches in order, keeping the first record seen for each id.
pub fn merge_unique<I>(batches: I) -> Vec<MovieRecord>
where
    I: IntoIterator<Item = Vec<MovieRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for batch in batches {
        for movie in batch {
            if seen.insert(movie.id) {
                merged.push(movie);
            }
        }
    }
    merged
}

pub fn is_allowed_language(code: &str) -> bool {
    ALLOWED_LANGUAGES.contains(&code)
}

/// Most popular first. Stable, so equal scores keep their merge order.
pub fn sort_by_popularity(movies: &mut [MovieRecord]) {
    movies.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
}

fn language_distribution(movies: &[MovieRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for movie in movies {
        let lang = if movie.original_language.is_empty() {
            "unknown"
        } else {
            movie.original_language.as_str()
        };
        *counts.entry(lang.to_string()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub movies: Vec<MovieRecord>,
    pub total_results: usize,
}

pub struct MovieAggregator {
    search: Arc<dyn MovieSearch>,
    events: Arc<dyn EventSink>,
}

impl MovieAggregator {
    pub fn new(search: Arc<dyn MovieSearch>, events: Arc<dyn EventSink>) -> Self {
        Self { search, events }
    }

    pub async fn aggregate(&self, sport: &str) -> Result<Aggregation, AggregateError> {
        self.events.emit(MovieEvent::KeywordSelected {
            sport: sport.to_string(),
            keyword: keyword_for(sport).map(str::to_string),
        });

        let batches = self.run(&plan(sport)).await?;

        let merged = merge_unique(batches);
        self.events.emit(MovieEvent::Merged {
            combined: merged.len(),
        });

        let mut movies: Vec<MovieRecord> = merged
            .into_iter()
            .filter(|m| is_allowed_language(&m.original_language))
            .collect();
        self.events.emit(MovieEvent::Filtered {
            retained: movies.len(),
            languages: language_distribution(&movies),
        });

        sort_by_popularity(&mut movies);

        Ok(Aggregation {
            total_results: movies.len(),
            movies,
        })
    }

    /// Runs each step in turn. A best-effort step rejected with an error
    /// status yields an empty batch; every other failure stops the run.
    async fn run(&self, steps: &[SearchStep]) -> Result<Vec<Vec<MovieRecord>>, AggregateError> {
        let mut batches = Vec::with_capacity(steps.len());

        for step in steps {
            match self.search.search(&step.query).await {
                Ok(response) => {
                    self.events.emit(MovieEvent::StageCompleted {
                        stage: step.stage,
                        query: step.query.clone(),
                        results: response.results.len(),
                    });
                    batches.push(response.results);
                }
                Err(err) => {
                    let fatal = step.stage.policy().is_fatal(&err);
                    self.events.emit(MovieEvent::StageFailed {
                        stage: step.stage,
                        query: step.query.clone(),
                        fatal,
                        error: err.to_string(),
                    });
                    if fatal {
                        return Err(AggregateError::FatalStage {
                            stage: step.stage,
                            source: err,
                        });
                    }
                    batches.push(Vec::new());
                }
            }
        }

        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::testing::{movie, FakeSearch};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn ids(movies: &[MovieRecord]) -> Vec<u64> {
        movies.iter().map(|m| m.id).collect()
    }

    fn aggregator(search: &Arc<FakeSearch>) -> (MovieAggregator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (MovieAggregator::new(search.clone(), sink.clone()), sink)
    }

    #[test]
    fn keyword_substitutions() {
        let expected = [
            ("basketball", "NBA"),
            ("football", "NFL"),
            ("soccer", "FIFA"),
            ("combat", "UFC"),
            ("esports", "league of legends"),
            ("tennis", "wimbledon"),
            ("golf", "PGA"),
            ("olympics", "olympic games"),
        ];
        for (sport, keyword) in expected {
            assert_eq!(keyword_for(sport), Some(keyword));
        }
        assert_eq!(keyword_for("Basketball"), Some("NBA"));
        assert_eq!(keyword_for("rugby"), None);
    }

    #[test]
    fn plan_for_mapped_sport() {
        let steps = plan("Combat");
        let queries: Vec<(Stage, &str)> = steps
            .iter()
            .map(|s| (s.stage, s.query.as_str()))
            .collect();
        assert_eq!(
            queries,
            vec![
                (Stage::Documentary, "Combat documentary"),
                (Stage::Sport, "Combat"),
                (Stage::Keyword, "UFC"),
                (Stage::Broad, "Combat movie"),
            ]
        );
    }

    #[test]
    fn plan_for_unmapped_sport_skips_keyword() {
        let stages: Vec<Stage> = plan("rugby").iter().map(|s| s.stage).collect();
        assert_eq!(stages, vec![Stage::Documentary, Stage::Sport, Stage::Broad]);
    }

    #[test]
    fn merge_keeps_first_occurrence() {
        let mut first = movie(1, "en", 1.0);
        first.title = "first".to_string();
        let mut dup = movie(1, "en", 99.0);
        dup.title = "dup".to_string();

        let merged = merge_unique(vec![
            vec![first, movie(2, "en", 2.0), movie(2, "en", 2.0)],
            vec![dup, movie(3, "fr", 3.0)],
        ]);

        assert_eq!(ids(&merged), vec![1, 2, 3]);
        assert_eq!(merged[0].title, "first");
    }

    #[test]
    fn sort_is_stable_for_equal_popularity() {
        let mut movies = vec![
            movie(1, "en", 5.0),
            movie(2, "en", 9.0),
            movie(3, "en", 5.0),
            movie(4, "en", 5.0),
        ];
        sort_by_popularity(&mut movies);
        assert_eq!(ids(&movies), vec![2, 1, 3, 4]);
    }

    #[tokio::test]
    async fn combat_scenario() {
        let search = Arc::new(
            FakeSearch::default()
                .with("combat documentary", vec![movie(1, "en", 10.0), movie(2, "ja", 50.0)])
                .with("UFC", vec![movie(2, "ja", 50.0), movie(3, "es", 30.0)]),
        );
        let (aggregator, _) = aggregator(&search);

        let result = aggregator.aggregate("combat").await.unwrap();

        assert_eq!(ids(&result.movies), vec![3, 1]);
        assert_eq!(result.total_results, 2);
        assert_eq!(
            search.calls(),
            vec!["combat documentary", "combat", "UFC", "combat movie"]
        );
    }

    #[tokio::test]
    async fn unmapped_sport_issues_three_queries() {
        let search = Arc::new(FakeSearch::default());
        let (aggregator, _) = aggregator(&search);

        let result = aggregator.aggregate("rugby").await.unwrap();

        assert!(result.movies.is_empty());
        assert_eq!(
            search.calls(),
            vec!["rugby documentary", "rugby", "rugby movie"]
        );
    }

    #[tokio::test]
    async fn output_invariants_hold() {
        let search = Arc::new(
            FakeSearch::default()
                .with(
                    "tennis documentary",
                    vec![movie(1, "en", 4.0), movie(2, "de", 8.0), movie(1, "en", 4.0)],
                )
                .with("tennis", vec![movie(2, "de", 8.0), movie(3, "ko", 100.0)])
                .with("wimbledon", vec![movie(4, "it", 8.0), movie(5, "", 1.0)])
                .with("tennis movie", vec![movie(6, "fr", 0.5), movie(7, "es", 12.0)]),
        );
        let (aggregator, sink) = aggregator(&search);

        let result = aggregator.aggregate("tennis").await.unwrap();

        assert_eq!(ids(&result.movies), vec![7, 2, 4, 1, 6]);
        let unique: HashSet<u64> = result.movies.iter().map(|m| m.id).collect();
        assert_eq!(unique.len(), result.movies.len());
        assert!(result
            .movies
            .iter()
            .all(|m| is_allowed_language(&m.original_language)));
        assert!(result
            .movies
            .windows(2)
            .all(|w| w[0].popularity >= w[1].popularity));

        let events = sink.events();
        assert!(events.contains(&MovieEvent::Merged { combined: 7 }));
        assert!(events.contains(&MovieEvent::Filtered {
            retained: 5,
            languages: BTreeMap::from([
                ("de".to_string(), 1),
                ("en".to_string(), 1),
                ("es".to_string(), 1),
                ("fr".to_string(), 1),
                ("it".to_string(), 1),
            ]),
        }));
    }

    #[tokio::test]
    async fn aggregation_is_idempotent() {
        let search = Arc::new(
            FakeSearch::default()
                .with("golf documentary", vec![movie(1, "en", 3.0), movie(2, "en", 3.0)])
                .with("PGA", vec![movie(3, "es", 7.0)]),
        );
        let (aggregator, _) = aggregator(&search);

        let first = aggregator.aggregate("golf").await.unwrap();
        let second = aggregator.aggregate("golf").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn best_effort_failures_are_skipped() {
        let search = Arc::new(
            FakeSearch::default()
                .with("soccer documentary", vec![movie(1, "en", 1.0)])
                .failing("FIFA", TmdbError::Status(StatusCode::SERVICE_UNAVAILABLE))
                .failing("soccer movie", TmdbError::Status(StatusCode::NOT_FOUND)),
        );
        let (aggregator, sink) = aggregator(&search);

        let result = aggregator.aggregate("soccer").await.unwrap();

        assert_eq!(ids(&result.movies), vec![1]);
        let failures: Vec<(Stage, bool)> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                MovieEvent::StageFailed { stage, fatal, .. } => Some((stage, fatal)),
                _ => None,
            })
            .collect();
        assert_eq!(
            failures,
            vec![(Stage::Keyword, false), (Stage::Broad, false)]
        );
    }

    #[tokio::test]
    async fn keyword_parse_error_is_fatal() {
        let search = Arc::new(
            FakeSearch::default()
                .with("combat documentary", vec![movie(1, "en", 10.0)])
                .failing("UFC", TmdbError::Parse("expected value".to_string())),
        );
        let (aggregator, sink) = aggregator(&search);

        let err = aggregator.aggregate("combat").await.unwrap_err();

        assert!(matches!(
            err,
            AggregateError::FatalStage {
                stage: Stage::Keyword,
                source: TmdbError::Parse(_),
            }
        ));
        assert_eq!(search.calls(), vec!["combat documentary", "combat", "UFC"]);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            MovieEvent::StageFailed {
                stage: Stage::Keyword,
                fatal: true,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn broad_network_error_is_fatal() {
        let search = Arc::new(FakeSearch::default().failing(
            "rugby movie",
            TmdbError::Network("connection reset".to_string()),
        ));
        let (aggregator, _) = aggregator(&search);

        let err = aggregator.aggregate("rugby").await.unwrap_err();

        assert!(matches!(
            err,
            AggregateError::FatalStage {
                stage: Stage::Broad,
                source: TmdbError::Network(_),
            }
        ));
    }

    #[test]
    fn best_effort_only_tolerates_error_statuses() {
        let status = TmdbError::Status(StatusCode::TOO_MANY_REQUESTS);
        let parse = TmdbError::Parse("eof".to_string());
        let network = TmdbError::Network("refused".to_string());

        assert!(!FailurePolicy::BestEffort.is_fatal(&status));
        assert!(FailurePolicy::BestEffort.is_fatal(&parse));
        assert!(FailurePolicy::BestEffort.is_fatal(&network));
        assert!(FailurePolicy::Fatal.is_fatal(&status));
    }

    #[tokio::test]
    async fn fatal_failure_stops_the_run() {
        let search = Arc::new(
            FakeSearch::default()
                .with("football documentary", vec![movie(1, "en", 1.0)])
                .failing("football", TmdbError::Status(StatusCode::UNAUTHORIZED)),
        );
        let (aggregator, _) = aggregator(&search);

        let err = aggregator.aggregate("football").await.unwrap_err();

        assert!(matches!(
            err,
            AggregateError::FatalStage {
                stage: Stage::Sport,
                ..
            }
        ));
        assert_eq!(search.calls(), vec!["football documentary", "football"]);
    }

    #[tokio::test]
    async fn all_queries_failing_is_fatal_at_first_stage() {
        let failure = TmdbError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        let search = Arc::new(
            FakeSearch::default()
                .failing("basketball documentary", failure.clone())
                .failing("basketball", failure.clone())
                .failing("NBA", failure.clone())
                .failing("basketball movie", failure),
        );
        let (aggregator, _) = aggregator(&search);

        let err = aggregator.aggregate("basketball").await.unwrap_err();

        assert!(matches!(
            err,
            AggregateError::FatalStage {
                stage: Stage::Documentary,
                ..
            }
        ));
        assert_eq!(search.calls().len(), 1);
    }
}
