//! Logger module
//!
//! Provides logging utilities for the dispatcher including:
//! - Server lifecycle logging
//! - Per-request access logging in several formats
//! - Error, warning and debug logging
//! - File-based logging support
//!
//! Before `init` is called (library use, tests) lines go to stdout/stderr at
//! `info` level.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AccessLogFormat, AppState, LogLevel, LoggingConfig};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(config)
}

fn enabled(level: LogLevel) -> bool {
    writer::get().map_or(level <= LogLevel::Info, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, secure: bool, state: &AppState) {
    if !enabled(LogLevel::Info) {
        return;
    }
    let scheme = if secure { "https" } else { "http" };
    write_info("======================================");
    write_info("Dispatch server started");
    write_info(&format!("Listening on: {scheme}://{addr}"));
    match &state.registry {
        Some(_) => write_info("API routes: installed"),
        None => write_info("API routes: none (static-only mode)"),
    }
    if state.static_serving {
        write_info(&format!("Static root: {}", state.root.display()));
    } else {
        write_info("Static serving: disabled");
    }
    write_info(&format!("API content type: {}", state.api_content_type));
    write_info(&format!("Max body size: {} bytes", state.max_body_size));
    write_info(&format!("Log level: {}", state.config.logging.level));
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    log_warning(&format!("Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    if enabled(LogLevel::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_rejection(method: &str, path: &str, reason: &crate::error::Rejection) {
    log_debug(&format!("[Rejected] {method} {path}: {reason}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown(addr: &SocketAddr) {
    log_info(&format!("Shutdown signal received, closing listener on {addr}"));
}
