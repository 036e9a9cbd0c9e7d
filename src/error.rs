use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response;

/// Failure to retrieve the feed document from upstream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("feed request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream responded with HTTP {0}")]
    HttpStatus(u16),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return TransportError::HttpStatus(status.as_u16());
        }
        TransportError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch feed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid RSS feed structure: {0}")]
    Parse(String),

    #[error("No cached news available: {0}")]
    EmptyCache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Transport(_) | AppError::Parse(_) => StatusCode::BAD_GATEWAY,
            AppError::EmptyCache(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::failure(self.status(), self.to_string()).into_response()
    }
}

impl From<quick_xml::de::DeError> for AppError {
    fn from(err: quick_xml::de::DeError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<std::str::Utf8Error> for AppError {
    fn from(err: std::str::Utf8Error) -> Self {
        AppError::Parse(format!("feed is not valid UTF-8: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
