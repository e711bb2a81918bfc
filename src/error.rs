use crate::server::types::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    UnsupportedInput(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`Error`], reported to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    UnsupportedInput,
    PayloadTooLarge,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation | Self::UnsupportedInput => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client mistakes as opposed to backend faults.
    pub fn is_client_error(self) -> bool {
        self.status().is_client_error()
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported_input(msg: impl Into<String>) -> Self {
        Self::UnsupportedInput(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnsupportedInput(_) => ErrorKind::UnsupportedInput,
            Self::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            Self::Upstream(_) => ErrorKind::Upstream,
            _ => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    /// Builds the HTTP error response. Server-side faults only reveal their
    /// message when `expose_internal` is set.
    pub fn to_response(&self, expose_internal: bool) -> Response {
        let kind = self.kind();
        let message = if kind.is_client_error() || expose_internal {
            self.to_string()
        } else {
            "Internal server error".to_string()
        };
        (
            kind.status(),
            Json(ErrorResponse {
                error: message,
                kind: Some(kind),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.to_response(true)
    }
}
