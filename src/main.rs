use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use vapeshop_api::config::AppConfig;
use vapeshop_api::db::{establish_connection_pool, run_migrations};
use vapeshop_api::media::{CloudinaryStore, MediaStore};
use vapeshop_api::rate_limit::{InMemoryCounterStore, RateLimiter};
use vapeshop_api::repository::DieselRepository;
use vapeshop_api::routes;

const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_migrations(&pool) {
        log::error!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }
    let repo = DieselRepository::new(pool);

    let media: Arc<dyn MediaStore> = match CloudinaryStore::new(config.media.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to build media client: {e}");
            std::process::exit(1);
        }
    };
    let media = web::Data::from(media);

    let limiter = RateLimiter::uploads(
        Arc::new(InMemoryCounterStore::new()),
        config.server.uploads_per_hour,
    );
    let purger = limiter.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(RATE_LIMIT_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            purger.purge();
        }
    });
    let limiter = web::Data::new(limiter);

    let server_config = web::Data::new(config.server.clone());

    log::info!("Listening on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(server_config.clone())
            .app_data(media.clone())
            .app_data(limiter.clone())
            .configure(routes::configure)
    })
    .bind((config.address.as_str(), config.port))?
    .run()
    .await
}
