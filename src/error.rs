use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("could not reach the movie database, please try again later")]
    UpstreamUnavailable(#[source] reqwest::Error),

    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    /// One-line text suitable for a flash message. Internal detail stays in
    /// the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unexpected(_) => "something went wrong, please try again".to_string(),
            other => other.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Unexpected(anyhow::Error::new(err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamUnavailable(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Unexpected(err) => tracing::error!(error = ?err, "unhandled error"),
            AppError::UpstreamUnavailable(err) => {
                tracing::warn!(error = ?err, "metadata source unreachable")
            },
            _ => {},
        }
        let body = crate::templates::error_page(self.user_message());
        (self.status(), Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
