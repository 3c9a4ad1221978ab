use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] amigo_persist::PersistError),

    #[error("Graph execution error: {0}")]
    Graph(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing your request".to_string(),
                )
            }
            ApiError::Graph(ref e) => {
                tracing::error!("Graph error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Processing error".to_string())
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
