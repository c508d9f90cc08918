use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{config::ConfigError, menus::MenuError, store::StoreError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MalformedPayload(String),

    #[error("Menu not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Write routes answer every failure other than a missing record with 400.
    pub fn rejected(err: MenuError) -> Self {
        match err {
            MenuError::NotFound => AppError::NotFound,
            other => AppError::MalformedPayload(other.to_string()),
        }
    }
}

impl From<MenuError> for AppError {
    fn from(err: MenuError) -> Self {
        match err {
            MenuError::NotFound => AppError::NotFound,
            MenuError::Validation(message) => AppError::MalformedPayload(message),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
