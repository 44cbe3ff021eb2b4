use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Result;
use env_logger::Env;
use log::info;

use api::AppState;
use config::Config;
use fetcher::RateFetcher;
use store::{FileStore, RateStore};

mod api;
mod config;
mod convert;
mod fetcher;
mod snapshot;
mod store;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let store: Arc<dyn RateStore> = Arc::new(FileStore::open(&config.cache_file));
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    let fetcher = RateFetcher::new(
        client,
        config.provider_url.clone(),
        config.access_key.clone(),
        store.clone(),
    );
    let state = web::Data::new(AppState { store, fetcher });

    info!("Listening on port {}", config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(api::index))
            .route("/api/v1/convert", web::get().to(api::convert))
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await?;

    Ok(())
}
