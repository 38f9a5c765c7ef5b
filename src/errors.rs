use actix_web::{
    error,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::{Display, Error};
use log::error;

/// Expected outcomes of every domain operation. Each variant carries the
/// reason surfaced to the caller; storage failures collapse to `Internal`
/// after being logged.
#[derive(Debug, Display, Error, serde::Serialize)]
pub enum ApiError {
    #[display(fmt = "not found: {}", _0)]
    NotFound(#[error(ignore)] String),

    #[display(fmt = "forbidden: {}", _0)]
    Forbidden(#[error(ignore)] String),

    #[display(fmt = "conflict: {}", _0)]
    Conflict(#[error(ignore)] String),

    #[display(fmt = "invalid request: {}", _0)]
    Validation(#[error(ignore)] String),

    #[display(fmt = "authentication error: {}", _0)]
    Auth(#[error(ignore)] String),

    #[display(fmt = "internal error")]
    Internal,
}

impl error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                ApiError::NotFound("requested record does not exist".to_string())
            }
            other => {
                error!("storage failure: {:?}", other);
                ApiError::Internal
            }
        }
    }
}
