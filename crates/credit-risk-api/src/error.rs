use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::logging::LoggingError;
use crate::protocol::ErrorBody;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Every way a request can fail. Client-input kinds map to 400, `NotFound`
/// to 404, and `Internal` to a generic 500 whose detail only reaches the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request must include JSON body")]
    MissingBody,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{message}")]
    InvalidType {
        field: &'static str,
        message: &'static str,
    },

    #[error("{message}")]
    OutOfRange {
        field: &'static str,
        message: &'static str,
    },

    #[error("User not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingBody
            | Self::MissingField(_)
            | Self::InvalidType { .. }
            | Self::OutOfRange { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingBody => "missing_body",
            Self::MissingField(_) => "missing_field",
            Self::InvalidType { .. } => "invalid_type",
            Self::OutOfRange { .. } => "out_of_range",
            Self::NotFound => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message sent to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed with internal error");
        }
        (self.status(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),
}
