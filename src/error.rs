//! Error types
//!
//! `Rejection` covers every way a single request can end in an error response;
//! `ServerError` covers startup failures.

use crate::handler::ResponseBody;
use crate::http;
use hyper::{Response, StatusCode};
use std::net::SocketAddr;
use thiserror::Error;

/// Terminal error outcome of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("request path failed validation")]
    PathRejected,
    #[error("static file could not be opened")]
    FileNotFound,
    #[error("static files are only served for GET")]
    MethodNotAllowed,
    #[error("no API route and static serving is disabled")]
    StaticServingDisabled,
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,
    #[error("request body could not be read")]
    BodyUnreadable,
}

impl Rejection {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::PathRejected | Self::FileNotFound | Self::StaticServingDisabled => {
                StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyUnreadable => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_response(self) -> Response<ResponseBody> {
        match self {
            Self::PathRejected | Self::FileNotFound | Self::StaticServingDisabled => {
                http::build_404_response()
            }
            Self::MethodNotAllowed => http::build_405_response(),
            Self::PayloadTooLarge => http::build_413_response(),
            Self::BodyUnreadable => http::build_400_response(),
        }
    }
}

/// Startup and listener errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rustls::Error> for ServerError {
    fn from(e: rustls::Error) -> Self {
        Self::Tls(e.to_string())
    }
}
