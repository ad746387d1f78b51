//! HTTP response building module
//!
//! Builders for the fixed status responses and the two success shapes
//! (API text and streamed file).

use crate::handler::ResponseBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Wrap in-memory bytes as a response body
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not found.")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(ALLOW, "GET")
        .body(full_body("405 Method not allowed."))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full_body("405 Method not allowed."))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload too large.")
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::BAD_REQUEST, "400 Bad request.")
}

/// Build 200 response carrying a buffered handler's output
pub fn build_api_response(body: String, content_type: &str) -> Response<ResponseBody> {
    let content_length = body.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .body(full_body(body))
        .unwrap_or_else(|e| {
            log_build_error("API", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 200 response around a streamed file body
pub fn build_file_response(
    body: ResponseBody,
    content_type: &str,
    content_length: u64,
) -> Response<ResponseBody> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .body(());

    match response {
        Ok(response) => response.map(|()| body),
        Err(e) => {
            log_build_error("file", &e);
            Response::new(body)
        }
    }
}

fn build_text_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(full_body(message))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full_body(message))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
