use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;

use date_poll_api::{
    routes,
    store::{MemoryStore, PgStore, PollStore},
    AppConfig, AppData, PollEngine,
};

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn PollStore>> {
    match &config.database_url {
        Some(database_url) => {
            let store = PgStore::connect(database_url)
                .await
                .context("failed to connect to database")?;
            store.migrate().await.context("failed to run migrations")?;
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL is not set, polls are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let store = open_store(&config).await?;
    let bind_address = config.bind_address.clone();
    let port = config.port;

    let app_data = web::Data::new(AppData {
        engine: PollEngine::new(store),
        config,
    });

    log::info!("listening on {}:{}", bind_address, port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .wrap(middleware::NormalizePath::new(
                middleware::TrailingSlash::Trim,
            ))
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure_api)
    })
    .bind((bind_address, port))
    .with_context(|| format!("could not bind to port {}", port))?
    .run()
    .await?;

    Ok(())
}
