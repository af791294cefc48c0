mod app;
mod auth;
mod config;
mod db;
mod handlers;
mod logging;
mod message;
mod models;
mod routes;
mod utils;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;

use crate::app::{configure_app, AppState};
use crate::config::{ServerSettings, Settings};
use crate::db::PgRepository;

fn cors(settings: &ServerSettings) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if settings.allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    settings
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = Settings::from_env()?;
    logging::init_tracing(&settings.logging);

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let state = web::Data::new(AppState::new(Arc::new(PgRepository::new(pool)), &settings));
    tokio::fs::create_dir_all(state.media.root()).await?;
    let server = settings.server.clone();

    tracing::info!(host = %server.host, port = server.port, "starting photo_app");

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&server))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .configure(configure_app(state.clone()))
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await?;

    Ok(())
}
