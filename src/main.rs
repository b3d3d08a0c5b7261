use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Result;
use dotenv::dotenv;

use pulseplay_api::{routes, Config, MovieService};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let service = web::Data::new(MovieService::from_config(&config)?);

    log::info!(
        "Starting PulsePlay movies API on {} (category cache {})",
        config.bind_address,
        if config.cache_enabled { "enabled" } else { "disabled" }
    );

    let cache_admin = config.cache_admin_enabled;
    if cache_admin {
        log::warn!("Cache administration routes are enabled");
    }

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(routes::configure)
            .configure(|cfg| {
                if cache_admin {
                    routes::configure_admin(cfg);
                }
            })
    })
        .bind(&config.bind_address)?
        .run()
        .await?;

    Ok(())
}
