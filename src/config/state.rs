// Application state module
// Settings the dispatcher reads on every request; frozen once serving starts

use std::path::PathBuf;

use super::types::Config;
use crate::http::mime;
use crate::logger;
use crate::routing::Registry;

/// Per-server dispatch configuration
///
/// Built from [`Config`], adjusted through the `Server` setters, then shared
/// read-only behind an `Arc` for the lifetime of the listener.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` disables API routing entirely
    pub registry: Option<Registry>,
    /// Content-Type of buffered handler responses
    pub api_content_type: &'static str,
    pub static_serving: bool,
    pub root: PathBuf,
    pub max_body_size: u64,
    pub access_log: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let mut state = Self {
            config: config.clone(),
            registry: None,
            api_content_type: mime::content_type(Some("txt")),
            static_serving: config.http.static_serving,
            root: config.server.root.clone(),
            max_body_size: config.http.max_body_size,
            access_log: config.logging.access_log,
        };
        state.set_api_content_type(&config.http.api_content_type);
        state
    }

    /// Label API responses with the MIME type registered for `extension`
    ///
    /// Unknown extensions fall back to `application/octet-stream`.
    pub fn set_api_content_type(&mut self, extension: &str) {
        let extension = extension.trim_start_matches('.');
        self.api_content_type = mime::lookup(extension).unwrap_or_else(|| {
            logger::log_warning(&format!(
                "Unknown API content type extension '{extension}', using {}",
                mime::DEFAULT_CONTENT_TYPE
            ));
            mime::DEFAULT_CONTENT_TYPE
        });
    }

    pub fn set_registry(&mut self, registry: Registry) {
        self.registry = Some(registry);
    }

    pub fn disable_static_serving(&mut self) {
        self.static_serving = false;
    }
}
