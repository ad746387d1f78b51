//! Request handler module
//!
//! Responsible for request dispatch: API handlers first, static files second.

pub mod dispatcher;
pub mod static_files;
pub mod types;

// Re-export main entry point
pub use dispatcher::{Dispatcher, Outcome};
pub use types::{
    request_body, BoxError, BufferedFn, Handler, HandlerFuture, ParsedUrl, RequestBody,
    ResponseBody, StreamingFn,
};
