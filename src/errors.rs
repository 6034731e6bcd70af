use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    AuthenticationError(String),

    #[error("An internal error occurred. Please try again later.")]
    InternalError,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, ApiError::AuthenticationError(_)) {
            builder.insert_header(("WWW-Authenticate", "Bearer"));
        }
        builder.json(serde_json::json!({ "detail": self.to_string() }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                ApiError::Conflict("resource already exists".to_string())
            }
            other => {
                log::error!("database failure: {other}");
                ApiError::InternalError
            }
        }
    }
}
