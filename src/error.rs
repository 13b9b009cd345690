use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("movie {0} not found")]
    NotFound(i32),
    #[error("no movie has the id `{0}`")]
    InvalidId(String),
    #[error("movie database request failed: {0}")]
    External(#[from] reqwest::Error),
    #[error("movie database returned an unexpected response: {0}")]
    MalformedResponse(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::InvalidId(_) => StatusCode::NOT_FOUND,
            AppError::External(_) | AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the user. Store failures are not echoed back verbatim.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Other(_) => {
                "Something went wrong while handling your request.".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = crate::templates::error_page(status, &self.public_message());
        (status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
