//! Request dispatch module
//!
//! Entry point for HTTP request processing. Each request moves through
//! validate -> resolve -> (stream | accumulate | static fallback) and ends in
//! exactly one response.

use crate::config::AppState;
use crate::error::Rejection;
use crate::handler::static_files;
use crate::handler::{BufferedFn, Handler, ParsedUrl, RequestBody, ResponseBody};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::is_valid_path;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Which branch produced the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Buffered API handler
    Api,
    /// Streaming API handler
    Stream,
    /// Static file
    Static,
    Rejected(Rejection),
}

impl Outcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Stream => "stream",
            Self::Static => "static",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Routes requests against a frozen [`AppState`]
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<AppState>,
}

impl Dispatcher {
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Dispatch with access logging; what the connection layer calls
    pub async fn handle(
        &self,
        req: Request<RequestBody>,
        remote_addr: SocketAddr,
    ) -> Result<Response<ResponseBody>, Infallible> {
        if !self.state.access_log {
            return Ok(self.dispatch(req).await);
        }

        let started = Instant::now();
        let mut entry = AccessLogEntry::new(
            remote_addr.to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = http_version_label(req.version()).to_string();
        entry.referer = header_string(req.headers(), REFERER);
        entry.user_agent = header_string(req.headers(), USER_AGENT);

        let (outcome, response) = self.dispatch_traced(req).await;

        entry.status = response.status().as_u16();
        entry.body_bytes = response_body_bytes(&response);
        entry.outcome = outcome.label();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, self.state.config.logging.access_log_format);

        Ok(response)
    }

    /// Run the dispatch state machine for one request
    pub async fn dispatch(&self, req: Request<RequestBody>) -> Response<ResponseBody> {
        self.dispatch_traced(req).await.1
    }

    /// Like [`Self::dispatch`], also reporting which branch answered
    pub async fn dispatch_traced(
        &self,
        req: Request<RequestBody>,
    ) -> (Outcome, Response<ResponseBody>) {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.route(req).await {
            Ok(routed) => routed,
            Err(rejection) => {
                logger::log_rejection(method.as_str(), &path, &rejection);
                (Outcome::Rejected(rejection), rejection.into_response())
            }
        }
    }

    async fn route(
        &self,
        req: Request<RequestBody>,
    ) -> Result<(Outcome, Response<ResponseBody>), Rejection> {
        // 1. Validate
        if !is_valid_path(req.uri().path()) {
            return Err(Rejection::PathRejected);
        }

        // 2. Resolve
        let handler = self
            .state
            .registry
            .as_ref()
            .and_then(|registry| registry.resolve(req.uri().path(), req.method().as_str()))
            .cloned();

        match handler {
            Some(Handler::Streaming(handler)) => Ok((Outcome::Stream, handler(req).await)),
            Some(Handler::Buffered(handler)) => {
                let response = self.accumulate(req, handler.as_ref()).await?;
                Ok((Outcome::Api, response))
            }
            None => {
                let response = self.static_fallback(req.method(), req.uri().path()).await?;
                Ok((Outcome::Static, response))
            }
        }
    }

    /// Collect the body in arrival order, then run the buffered handler
    async fn accumulate(
        &self,
        req: Request<RequestBody>,
        handler: &BufferedFn,
    ) -> Result<Response<ResponseBody>, Rejection> {
        let limit = self.state.max_body_size;
        check_content_length(req.headers(), limit)?;

        let (parts, body) = req.into_parts();
        let url = ParsedUrl::from_uri(&parts.uri);

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let bytes = match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => return Err(Rejection::PayloadTooLarge),
            Err(e) => {
                logger::log_warning(&format!("Failed to read request body: {e}"));
                return Err(Rejection::BodyUnreadable);
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let output = handler(&url, &*text);
        Ok(http::build_api_response(output, self.state.api_content_type))
    }

    /// Serve a file when no API route matched
    async fn static_fallback(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<Response<ResponseBody>, Rejection> {
        if !self.state.static_serving {
            return Err(Rejection::StaticServingDisabled);
        }
        if method != Method::GET {
            return Err(Rejection::MethodNotAllowed);
        }
        static_files::serve_file(&self.state.root, path).await
    }
}

/// Reject early when the declared body size is over the limit
fn check_content_length(headers: &HeaderMap, max_body_size: u64) -> Result<(), Rejection> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    match value.to_str().ok().and_then(|v| v.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(Rejection::PayloadTooLarge)
        }
        Some(_) => Ok(()),
        None => {
            logger::log_warning("Invalid Content-Length header, relying on streamed limit");
            Ok(())
        }
    }
}

/// Body size for the access log: exact size hint, else the declared length
fn response_body_bytes(response: &Response<ResponseBody>) -> Option<u64> {
    response.body().size_hint().exact().or_else(|| {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    })
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn http_version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
