use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::{dotenv, var};
use henka_core::{build_client, Yahoo};
use state::{AppState, DEFAULT_CACHE_CAPACITY};
use std::sync::Arc;

mod api;
mod pages;
mod state;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,actix_web=debug"))
        .init();

    let host = var("HENKA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = match var("HENKA_PORT") {
        Ok(port) => port.parse::<u16>().unwrap_or_else(|e| {
            log::warn!("ignoring HENKA_PORT={port}: {e}; falling back to 8080");
            8080
        }),
        Err(_) => 8080,
    };

    let cache_capacity = match var("HENKA_CACHE_CAPACITY") {
        Ok(capacity) => capacity.parse::<usize>().unwrap_or_else(|e| {
            log::warn!(
                "ignoring HENKA_CACHE_CAPACITY={capacity}: {e}; falling back to {DEFAULT_CACHE_CAPACITY}"
            );
            DEFAULT_CACHE_CAPACITY
        }),
        Err(_) => DEFAULT_CACHE_CAPACITY,
    };

    // one shared provider client & fetch cache for every worker
    let yahoo = Yahoo::new(build_client()?);
    let state = web::Data::new(AppState::with_cache_capacity(Arc::new(yahoo), cache_capacity)?);

    log::info!("serving the returns viewer on http://{host}:{port}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            // wizard pages
            .configure(pages::config)
            // json endpoints
            .configure(api::config)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
