use axum::{
    Router,
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::{
    AppState, csrf,
    error::{AppError, AppResult},
    forms::{EditForm, FormErrors, SearchForm},
    models::Movie,
    ranking, templates,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/edit/{id}", get(edit_form).post(edit_submit))
        .route("/delete/{id}", get(delete))
        .route("/add", get(add_form).post(add_submit))
        .route("/select/{tmdb_id}", get(select))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    let movies = ranking::refresh(state.repo.as_ref()).await?;
    Ok(Html(templates::index_page(&movies)))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: SignedCookieJar,
) -> AppResult<impl IntoResponse> {
    let movie = find(&state, parse_id(&id)?).await?;
    let (jar, token) = csrf::issue(jar);
    let body = templates::edit_page(&movie, &EditForm::default(), &FormErrors::default(), &token);
    Ok((jar, Html(body)))
}

pub async fn edit_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: SignedCookieJar,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let movie = find(&state, id).await?;

    match with_csrf(&jar, &form.csrf_token, form.validate()) {
        Ok(edit) => {
            let movie = state.repo.save(edit.apply(movie)).await?;
            info!(id = movie.id, rating = movie.rating, "movie rated");
            Ok(Redirect::to("/").into_response())
        },
        Err(errors) => {
            warn!(id = id, ?errors, "edit form rejected");
            let (jar, token) = csrf::issue(jar);
            let body = templates::edit_page(&movie, &form, &errors, &token);
            Ok((jar, Html(body)).into_response())
        },
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let id = parse_id(&id)?;
    if !state.repo.delete_by_id(id).await? {
        return Err(AppError::NotFound(id));
    }
    info!(id = id, "movie deleted");
    Ok(Redirect::to("/"))
}

pub async fn add_form(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, token) = csrf::issue(jar);
    (jar, Html(templates::add_page(&SearchForm::default(), &FormErrors::default(), &token)))
}

pub async fn add_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    match with_csrf(&jar, &form.csrf_token, form.validate()) {
        Ok(query) => {
            let results = state.catalog.search(&query, 1).await?;
            debug!(query = %query, results = results.len(), "search finished");
            Ok(Html(templates::select_page(&query, &results)).into_response())
        },
        Err(errors) => {
            warn!(?errors, "search form rejected");
            let (jar, token) = csrf::issue(jar);
            Ok((jar, Html(templates::add_page(&form, &errors, &token))).into_response())
        },
    }
}

pub async fn select(
    State(state): State<AppState>,
    Path(tmdb_id): Path<String>,
) -> AppResult<Redirect> {
    let tmdb_id = parse_id(&tmdb_id)?;
    let details = state.catalog.details(tmdb_id).await?;
    let new_movie = details.into_new_movie(&state.config.tmdb_image_base_url)?;
    let movie = state.repo.insert(new_movie).await?;
    info!(id = movie.id, tmdb_id = tmdb_id, title = %movie.title, "movie added");
    Ok(Redirect::to(&format!("/edit/{}", movie.id)))
}

/// Ids arrive as raw path segments so a malformed one still gets the HTML error page.
fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse().map_err(|_| AppError::InvalidId(raw.to_string()))
}

async fn find(state: &AppState, id: i32) -> AppResult<Movie> {
    state.repo.get_by_id(id).await?.ok_or(AppError::NotFound(id))
}

/// Folds a failed token check into the form's own validation result.
fn with_csrf<T>(
    jar: &SignedCookieJar,
    token: &str,
    validated: Result<T, FormErrors>,
) -> Result<T, FormErrors> {
    if csrf::verify(jar, token) {
        return validated;
    }
    let mut errors = validated.err().unwrap_or_default();
    errors.add_form("The form has expired. Please submit it again.");
    Err(errors)
}
