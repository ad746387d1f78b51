//! Embeddable HTTP(S) server that dispatches requests to registered API
//! handlers and falls back to static files.
//!
//! ```no_run
//! use dispatch_server::{Config, Handler, Registry, Server};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.insert("/api/echo", "POST", Handler::buffered(|_, body| body.to_string()))?;
//!
//! let mut server = Server::new(Config::default());
//! server.set_api_registry(registry);
//! server.set_api_content_type("json");
//! server.serve(Some(8080), Some("127.0.0.1")).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use config::{AppState, Config};
pub use error::{Rejection, ServerError};
pub use handler::{Dispatcher, Handler, Outcome, ParsedUrl, RequestBody, ResponseBody};
pub use routing::{Registry, RegistryError, RouteNode};
pub use server::{Listening, Server, TlsMaterial};
