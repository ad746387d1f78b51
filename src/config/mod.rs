// Configuration module entry point
// Loads layered configuration and builds the per-server state

mod state;
mod types;

pub use state::AppState;
pub use types::{
    AccessLogFormat, Config, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig,
    ServerConfig, TlsConfig, DEFAULT_HOST, DEFAULT_PORT,
};

use crate::error::ServerError;
use types::{DEFAULT_API_CONTENT_TYPE, DEFAULT_MAX_BODY_SIZE, DEFAULT_ROOT, DEFAULT_TIMEOUT_SECS};

/// Environment variable prefix, e.g. `DISPATCH_SERVER__PORT=9000`
const ENV_PREFIX: &str = "DISPATCH";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Sources, lowest priority first: built-in defaults, the file (if present),
    /// `DISPATCH_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, ServerError> {
        let settings = ::config::Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.root", DEFAULT_ROOT)?
            .set_default("http.api_content_type", DEFAULT_API_CONTENT_TYPE)?
            .set_default("http.static_serving", true)?
            .set_default("http.max_body_size", DEFAULT_MAX_BODY_SIZE)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", DEFAULT_TIMEOUT_SECS)?
            .set_default("performance.write_timeout", DEFAULT_TIMEOUT_SECS)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject combinations the server cannot start with
    pub fn validate(&self) -> Result<(), ServerError> {
        match (&self.tls.cert, &self.tls.key) {
            (Some(_), None) => Err(ServerError::InvalidConfig(
                "tls.cert is set but tls.key is missing".to_string(),
            )),
            (None, Some(_)) => Err(ServerError::InvalidConfig(
                "tls.key is set but tls.cert is missing".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
