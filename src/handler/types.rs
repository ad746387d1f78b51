//! Handler model shared by the registry and the dispatcher

use http_body_util::combinators::{BoxBody, UnsyncBoxBody};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, Uri};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type-erased error carried by request bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Request body as seen by handlers (unbuffered)
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// Response body produced by the dispatcher and by streaming handlers
pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

/// Wrap in-memory bytes as a [`RequestBody`]
pub fn request_body(data: impl Into<Bytes>) -> RequestBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Future returned by a streaming handler
///
/// Connections are driven on a single thread, so the future does not need to be `Send`.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response<ResponseBody>>>>;

/// Buffered handler: parsed URL plus the complete body text in, body text out
pub type BufferedFn = dyn Fn(&ParsedUrl, &str) -> String + Send + Sync;

/// Streaming handler: raw request in, complete response out
pub type StreamingFn = dyn Fn(Request<RequestBody>) -> HandlerFuture + Send + Sync;

/// Application logic bound to a path and method
#[derive(Clone)]
pub enum Handler {
    /// Invoked once with the whole request body already collected
    Buffered(Arc<BufferedFn>),
    /// Given the raw request stream; owns status, headers and body of the response
    Streaming(Arc<StreamingFn>),
}

impl Handler {
    pub fn buffered<F>(f: F) -> Self
    where
        F: Fn(&ParsedUrl, &str) -> String + Send + Sync + 'static,
    {
        Self::Buffered(Arc::new(f))
    }

    pub fn streaming<F, Fut>(f: F) -> Self
    where
        F: Fn(Request<RequestBody>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response<ResponseBody>> + 'static,
    {
        Self::Streaming(Arc::new(move |req| -> HandlerFuture { Box::pin(f(req)) }))
    }

    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(_) => f.write_str("Handler::Buffered"),
            Self::Streaming(_) => f.write_str("Handler::Streaming"),
        }
    }
}

/// Request URL handed to buffered handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Path component, as received
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    /// Percent-decoded query pairs in order of appearance
    pub params: Vec<(String, String)>,
}

impl ParsedUrl {
    pub fn from_uri(uri: &Uri) -> Self {
        let query = uri.query().map(ToString::to_string);
        let params = query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: uri.path().to_string(),
            query,
            params,
        }
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_url_query_params() {
        let uri: Uri = "/search?q=rust%20lang&page=2&q=again".parse().unwrap();
        let url = ParsedUrl::from_uri(&uri);

        assert_eq!(url.path, "/search");
        assert_eq!(url.query.as_deref(), Some("q=rust%20lang&page=2&q=again"));
        assert_eq!(url.param("q"), Some("rust lang"));
        assert_eq!(url.param("page"), Some("2"));
        assert_eq!(url.param("missing"), None);
        assert_eq!(url.params.len(), 3);
    }

    #[test]
    fn test_parsed_url_without_query() {
        let uri: Uri = "/plain".parse().unwrap();
        let url = ParsedUrl::from_uri(&uri);
        assert_eq!(url.query, None);
        assert!(url.params.is_empty());
    }

    #[test]
    fn test_handler_variants() {
        let buffered = Handler::buffered(|_, body| body.to_uppercase());
        assert!(!buffered.is_streaming());
        assert_eq!(format!("{buffered:?}"), "Handler::Buffered");

        let streaming = Handler::streaming(|_req| async {
            Response::new(crate::http::response::full_body("ok"))
        });
        assert!(streaming.is_streaming());
    }

    #[tokio::test]
    async fn test_request_body_from_bytes() {
        let body = request_body("payload");
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"payload");
    }
}
