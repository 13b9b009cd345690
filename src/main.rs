mod config;
mod csrf;
mod db;
mod entities;
mod error;
mod forms;
mod models;
mod ranking;
mod repository;
mod routes;
mod templates;
mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    config::Config,
    repository::{MovieRepository, SeaOrmMovieRepository},
    tmdb::{MovieCatalog, TmdbClient},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repo: Arc<dyn MovieRepository>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,topmovies=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    let cookie_key = csrf::cookie_key(config.secret_key.as_deref());

    let http = reqwest::Client::builder()
        .user_agent("topmovies/0.1")
        .timeout(Duration::from_secs(config.tmdb_timeout_secs))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );

    let state = AppState {
        config: config.clone(),
        repo: Arc::new(SeaOrmMovieRepository::new(db)),
        catalog: Arc::new(tmdb),
        cookie_key,
    };

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
