// Server module entry point
// Listener setup, connection serving, TLS and shutdown handling

pub mod bootstrap;
pub mod connection;
pub mod listener;
pub mod signal;
pub mod tls;

pub use bootstrap::{Listening, Server};
pub use listener::create_listener;
pub use signal::shutdown_signal;
pub use tls::TlsMaterial;
