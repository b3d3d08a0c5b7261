use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::error::ApiError;
use crate::models::MoviesResponse;
use crate::service::MovieService;

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    sport: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub cache_enabled: bool,
    pub stats: CacheStats,
}

pub async fn get_movies(
    query: web::Query<MoviesQuery>,
    service: web::Data<MovieService>,
) -> Result<HttpResponse, ApiError> {
    let sport = query.sport.as_deref().unwrap_or_default();
    let movies = service.movies_for_sport(sport).await?;
    Ok(HttpResponse::Ok().json(MoviesResponse::new(movies.to_vec())))
}

pub async fn cache_stats(service: web::Data<MovieService>) -> HttpResponse {
    let cache = service.cache();
    HttpResponse::Ok().json(CacheStatsResponse {
        cache_enabled: cache.is_enabled(),
        stats: cache.stats(),
    })
}

pub async fn clear_cache(service: web::Data<MovieService>) -> HttpResponse {
    service.cache().clear();
    HttpResponse::NoContent().finish()
}

/// Public routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // A query string that cannot be decoded has no usable `sport` either.
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| {
            log::debug!("Rejecting movies query: {}", err);
            ApiError::MissingSport.into()
        });

    cfg.service(
        web::resource("/api/movies")
            .app_data(query_config)
            .route(web::get().to(get_movies)),
    )
    .route("/api/cache/stats", web::get().to(cache_stats));
}

/// Operator routes that change state. Only mounted when
/// `CACHE_ADMIN_ENABLED` is set.
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/cache", web::delete().to(clear_cache));
}
