//! Command line interface
//!
//! `dispatch-server [PORT] [ADDRESS] [flags]`. Positional values feed the
//! listen address resolution in `Server`; flags override the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "dispatch-server")]
#[command(about = "HTTP server dispatching to API handlers with static file fallback", long_about = None)]
pub struct Cli {
    /// Port to listen on
    pub port: Option<u16>,

    /// Address to bind (IP or host name)
    pub address: Option<String>,

    /// Configuration file path (extension optional)
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Static file root directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Do not fall back to static files
    #[arg(long)]
    pub no_static: bool,

    /// File extension whose MIME type labels API responses
    #[arg(long, value_name = "EXT")]
    pub api_content_type: Option<String>,

    /// PEM certificate chain; enables TLS together with --tls-key
    #[arg(long, value_name = "PEM", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, value_name = "PEM", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Cli {
    /// Overlay command line flags onto a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.server.root.clone_from(root);
        }
        if self.no_static {
            config.http.static_serving = false;
        }
        if let Some(ext) = &self.api_content_type {
            config.http.api_content_type.clone_from(ext);
        }
        if self.tls_cert.is_some() {
            config.tls.cert.clone_from(&self.tls_cert);
            config.tls.key.clone_from(&self.tls_key);
        }
    }

    pub fn startup_args(&self) -> StartupArgs {
        StartupArgs {
            port: self.port,
            address: self.address.clone(),
        }
    }
}

/// Positional arguments given to the process at startup
///
/// Used when `serve` is called without an explicit port or address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupArgs {
    pub port: Option<u16>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_args() {
        let cli = Cli::try_parse_from(["dispatch-server", "9000", "0.0.0.0"]).unwrap();
        assert_eq!(
            cli.startup_args(),
            StartupArgs {
                port: Some(9000),
                address: Some("0.0.0.0".to_string()),
            }
        );
        assert_eq!(cli.config, "config");
    }

    #[test]
    fn test_no_args() {
        let cli = Cli::try_parse_from(["dispatch-server"]).unwrap();
        assert_eq!(cli.startup_args(), StartupArgs::default());
        assert!(!cli.no_static);
    }

    #[test]
    fn test_invalid_port() {
        assert!(Cli::try_parse_from(["dispatch-server", "http"]).is_err());
        assert!(Cli::try_parse_from(["dispatch-server", "70000"]).is_err());
    }

    #[test]
    fn test_tls_flags_require_each_other() {
        assert!(Cli::try_parse_from(["dispatch-server", "--tls-cert", "c.pem"]).is_err());
        assert!(Cli::try_parse_from(["dispatch-server", "--tls-key", "k.pem"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "dispatch-server",
            "--root",
            "/srv/www",
            "--no-static",
            "--api-content-type",
            "json",
            "--tls-cert",
            "c.pem",
            "--tls-key",
            "k.pem",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.server.root, PathBuf::from("/srv/www"));
        assert!(!config.http.static_serving);
        assert_eq!(config.http.api_content_type, "json");
        assert_eq!(config.tls.cert, Some(PathBuf::from("c.pem")));
        assert_eq!(config.tls.key, Some(PathBuf::from("k.pem")));
    }

    #[test]
    fn test_apply_keeps_config_when_flags_absent() {
        let cli = Cli::try_parse_from(["dispatch-server"]).unwrap();
        let mut config = Config::default();
        config.http.api_content_type = "html".to_string();
        cli.apply(&mut config);
        assert_eq!(config.http.api_content_type, "html");
        assert!(config.http.static_serving);
    }
}
