use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub secret_key: Option<String>,
    pub database_url: String,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_rps: u32,
    pub tmdb_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port: u16 = var("PORT", "3000").parse().context("PORT")?;

        let secret_key = lookup("SECRET_KEY").filter(|s| !s.trim().is_empty());

        let database_url = var("DATABASE_URL", "sqlite://my-favorite-movies.db?mode=rwc");

        let tmdb_api_key = var("TMDB_API_KEY", "");
        let tmdb_base_url = var("TMDB_BASE_URL", "https://api.themoviedb.org/3");
        let tmdb_image_base_url =
            var("TMDB_IMAGE_BASE_URL", "https://image.tmdb.org/t/p/original");

        let tmdb_rps: u32 = var("TMDB_RPS", "4").parse().context("TMDB_RPS")?;
        let tmdb_timeout_secs: u64 =
            var("TMDB_TIMEOUT_SECS", "30").parse().context("TMDB_TIMEOUT_SECS")?;

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            secret_key,
            database_url,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_rps,
            tmdb_timeout_secs,
        })
    }
}
