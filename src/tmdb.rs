use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::NewMovie,
};

/// External movie metadata source.
#[async_trait]
pub trait MovieCatalog: Send + Sync + 'static {
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<SearchResult>>;

    async fn details(&self, tmdb_id: i32) -> AppResult<MovieDetails>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, movie searches will be rejected upstream");
        }

        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN),
        )));
        Self { client, api_key, base_url, limiter }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<SearchResult>> {
        self.limiter.until_ready().await;
        debug!(query = %query, page = page, "searching TMDB");

        let resp: SearchResponse = self
            .client
            .get(self.url("search/movie"))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .query(&[("page", page)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(results = resp.results.len(), "TMDB search returned");
        Ok(resp.results)
    }

    async fn details(&self, tmdb_id: i32) -> AppResult<MovieDetails> {
        self.limiter.until_ready().await;
        debug!(tmdb_id = tmdb_id, "fetching TMDB movie details");

        let details = self
            .client
            .get(self.url(&format!("movie/{tmdb_id}")))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(details)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: i32,
    pub original_title: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

impl SearchResult {
    pub fn display_title(&self) -> &str {
        non_empty(&self.original_title).or(non_empty(&self.title)).unwrap_or("Untitled")
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(release_year)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i32,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

impl MovieDetails {
    /// Validates the fields a stored movie needs. The poster URL is the image
    /// base URL with `poster_path` appended as-is.
    pub fn into_new_movie(self, image_base_url: &str) -> AppResult<NewMovie> {
        let title = required(self.original_title, "original_title")?;
        let description = required(self.overview, "overview")?;
        let poster_path = required(self.poster_path, "poster_path")?;

        Ok(NewMovie {
            title,
            year: self.release_date.as_deref().and_then(release_year),
            description,
            img_url: format!("{image_base_url}{poster_path}"),
        })
    }
}

/// Year from the first four characters of a `YYYY-MM-DD` release date.
fn release_year(release_date: &str) -> Option<i32> {
    release_date.get(..4)?.parse().ok()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::MalformedResponse(format!("movie details missing `{field}`"))),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        routing::get,
    };
    use serde_json::{Value, json};

    use super::*;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

    fn details() -> MovieDetails {
        MovieDetails {
            id: 603,
            original_title: Some("The Matrix".into()),
            release_date: Some("1999-03-30".into()),
            overview: Some("A hacker learns the truth.".into()),
            poster_path: Some("/matrix.jpg".into()),
        }
    }

    #[test]
    fn details_become_an_unrated_record() {
        let movie = details().into_new_movie(IMAGE_BASE).unwrap();
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.year, Some(1999));
        assert_eq!(movie.description, "A hacker learns the truth.");
        assert_eq!(movie.img_url, "https://image.tmdb.org/t/p/original/matrix.jpg");
    }

    #[test]
    fn missing_required_fields_are_malformed() {
        for strip in ["original_title", "overview", "poster_path"] {
            let mut d = details();
            match strip {
                "original_title" => d.original_title = None,
                "overview" => d.overview = Some("   ".into()),
                _ => d.poster_path = None,
            }
            let err = d.into_new_movie(IMAGE_BASE).unwrap_err();
            assert!(matches!(&err, AppError::MalformedResponse(msg) if msg.contains(strip)));
        }
    }

    #[test]
    fn unknown_or_short_release_dates_leave_year_empty() {
        for date in [None, Some(""), Some("19"), Some("TBA-01-01")] {
            let d = MovieDetails { release_date: date.map(str::to_string), ..details() };
            assert_eq!(d.into_new_movie(IMAGE_BASE).unwrap().year, None);
        }
    }

    #[test]
    fn search_result_title_falls_back() {
        let result: SearchResult =
            serde_json::from_value(json!({ "id": 1, "title": "Localized", "original_title": "" }))
                .unwrap();
        assert_eq!(result.display_title(), "Localized");
        assert_eq!(result.release_year(), None);
    }

    async fn search_handler(Query(q): Query<Vec<(String, String)>>) -> (StatusCode, Json<Value>) {
        let has = |k: &str, v: &str| q.iter().any(|(qk, qv)| qk == k && qv == v);
        if !has("api_key", "secret") {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "status_message": "bad key" })));
        }
        if !(has("query", "matrix reloaded") && has("page", "1")) {
            return (StatusCode::BAD_REQUEST, Json(json!({})));
        }
        let body = json!({
            "page": 1,
            "results": [
                { "id": 604, "original_title": "The Matrix Reloaded", "release_date": "2003-05-15", "poster_path": null }
            ],
            "total_results": 1
        });
        (StatusCode::OK, Json(body))
    }

    async fn details_handler(Path(id): Path<i32>) -> (StatusCode, Json<Value>) {
        match id {
            604 => (
                StatusCode::OK,
                Json(json!({
                    "id": 604,
                    "original_title": "The Matrix Reloaded",
                    "release_date": "2003-05-15",
                    "overview": "Neo returns.",
                    "poster_path": "/reloaded.jpg",
                    "runtime": 138
                })),
            ),
            666 => (StatusCode::OK, Json(json!({ "id": 666, "original_title": null }))),
            _ => (StatusCode::NOT_FOUND, Json(json!({ "status_code": 34 }))),
        }
    }

    async fn fake_tmdb() -> SocketAddr {
        let app = Router::new()
            .route("/search/movie", get(search_handler))
            .route("/movie/{id}", get(details_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    fn client(addr: SocketAddr, key: &str) -> TmdbClient {
        TmdbClient::new(reqwest::Client::new(), key.to_string(), format!("http://{addr}/"), 50)
    }

    #[tokio::test]
    async fn search_sends_key_query_and_first_page() {
        let tmdb = client(fake_tmdb().await, "secret");
        let results = tmdb.search("matrix reloaded", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 604);
        assert_eq!(results[0].release_year(), Some(2003));
        assert_eq!(results[0].poster_path, None);
    }

    #[tokio::test]
    async fn rejected_key_is_an_external_error() {
        let tmdb = client(fake_tmdb().await, "wrong");
        let err = tmdb.search("matrix reloaded", 1).await.unwrap_err();
        assert!(matches!(err, AppError::External(_)));
    }

    #[tokio::test]
    async fn details_are_decoded() {
        let tmdb = client(fake_tmdb().await, "secret");
        let movie = tmdb.details(604).await.unwrap().into_new_movie(IMAGE_BASE).unwrap();
        assert_eq!(movie.title, "The Matrix Reloaded");
        assert_eq!(movie.img_url, "https://image.tmdb.org/t/p/original/reloaded.jpg");
    }

    #[tokio::test]
    async fn unknown_id_and_odd_shapes_fail_cleanly() {
        let tmdb = client(fake_tmdb().await, "secret");
        assert!(matches!(tmdb.details(1).await, Err(AppError::External(_))));

        let bare = tmdb.details(666).await.unwrap();
        assert!(matches!(bare.into_new_movie(IMAGE_BASE), Err(AppError::MalformedResponse(_))));
    }
}
