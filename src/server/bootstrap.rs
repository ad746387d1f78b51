// Server bootstrap module
// Collects dispatch settings, resolves the listen address and runs the accept loop

use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use super::connection::{serve_connection, ConnectionLimiter, ConnectionSettings};
use super::listener::create_listener;
use super::signal::shutdown_signal;
use super::tls::TlsMaterial;
use crate::cli::StartupArgs;
use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::handler::Dispatcher;
use crate::logger;
use crate::routing::Registry;

/// A configured but not yet listening server
///
/// Setters only affect the server before `bind`/`serve`; the state is frozen
/// once a listener exists.
#[derive(Debug)]
pub struct Server {
    state: AppState,
    startup: StartupArgs,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            state: AppState::new(&config),
            startup: StartupArgs::default(),
        }
    }

    /// Port/address given on the command line, used when `serve` gets none
    #[must_use]
    pub fn with_startup_args(mut self, startup: StartupArgs) -> Self {
        self.startup = startup;
        self
    }

    /// Label buffered API responses with the MIME type of `extension`
    pub fn set_api_content_type(&mut self, extension: &str) {
        self.state.set_api_content_type(extension);
    }

    pub fn set_api_registry(&mut self, registry: Registry) {
        self.state.set_registry(registry);
    }

    pub fn disable_static_serving(&mut self) {
        self.state.disable_static_serving();
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Resolve the listen address
    ///
    /// Each of port and address is taken from the first source that has it:
    /// the explicit argument, the startup arguments, then the configuration
    /// (which itself defaults to `127.0.0.1:8080`).
    pub fn listen_addr(
        &self,
        port: Option<u16>,
        address: Option<&str>,
    ) -> Result<SocketAddr, ServerError> {
        let server = &self.state.config.server;
        let port = port.or(self.startup.port).unwrap_or(server.port);
        let host = address
            .or(self.startup.address.as_deref())
            .unwrap_or(&server.host);
        resolve_socket_addr(host, port)
    }

    /// Bind a plain HTTP listener
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(self, port: Option<u16>, address: Option<&str>) -> Result<Listening, ServerError> {
        let addr = self.listen_addr(port, address)?;
        self.into_listening(addr, None)
    }

    /// Bind an HTTPS listener with the given certificate and key
    pub fn bind_secure(
        self,
        tls: TlsMaterial,
        port: Option<u16>,
        address: Option<&str>,
    ) -> Result<Listening, ServerError> {
        let addr = self.listen_addr(port, address)?;
        let acceptor = tls.acceptor()?;
        self.into_listening(addr, Some(acceptor))
    }

    /// Serve plain HTTP until SIGINT/SIGTERM
    pub async fn serve(self, port: Option<u16>, address: Option<&str>) -> Result<(), ServerError> {
        self.bind(port, address)?.run(shutdown_signal()).await;
        Ok(())
    }

    /// Serve HTTPS until SIGINT/SIGTERM
    pub async fn serve_secure(
        self,
        tls: TlsMaterial,
        port: Option<u16>,
        address: Option<&str>,
    ) -> Result<(), ServerError> {
        self.bind_secure(tls, port, address)?
            .run(shutdown_signal())
            .await;
        Ok(())
    }

    fn into_listening(
        self,
        addr: SocketAddr,
        acceptor: Option<TlsAcceptor>,
    ) -> Result<Listening, ServerError> {
        let listener = create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        logger::log_server_start(&local_addr, acceptor.is_some(), &self.state);

        let limiter = ConnectionLimiter::new(self.state.config.performance.max_connections);
        let dispatcher = Dispatcher::new(Arc::new(self.state));
        let settings = ConnectionSettings::from_state(&dispatcher);

        Ok(Listening {
            listener,
            local_addr,
            dispatcher,
            acceptor,
            limiter,
            settings,
        })
    }
}

/// A bound listener ready to accept connections
pub struct Listening {
    listener: TcpListener,
    local_addr: SocketAddr,
    dispatcher: Dispatcher,
    acceptor: Option<TlsAcceptor>,
    limiter: ConnectionLimiter,
    settings: ConnectionSettings,
}

impl Listening {
    /// Address actually bound (resolves port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub const fn is_secure(&self) -> bool {
        self.acceptor.is_some()
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Connections run as local tasks on the current thread. Connections
    /// still open when `shutdown` fires are dropped.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let local = tokio::task::LocalSet::new();
        local.run_until(self.accept_loop(shutdown)).await;
    }

    async fn accept_loop<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => self.accept_connection(stream, peer_addr),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                },
                () = &mut shutdown => {
                    logger::log_shutdown(&self.local_addr);
                    break;
                }
            }
        }
    }

    fn accept_connection(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let Some(guard) = self.limiter.try_acquire() else {
            drop(stream);
            return;
        };
        logger::log_connection_accepted(&peer_addr);

        let dispatcher = self.dispatcher.clone();
        let acceptor = self.acceptor.clone();
        let settings = self.settings;

        tokio::task::spawn_local(async move {
            let _guard = guard;
            match acceptor {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => {
                        serve_connection(tls_stream, peer_addr, dispatcher, settings).await;
                    }
                    Err(e) => {
                        logger::log_warning(&format!("TLS handshake with {peer_addr} failed: {e}"));
                    }
                },
                None => serve_connection(stream, peer_addr, dispatcher, settings).await,
            }
        });
    }
}

impl fmt::Debug for Listening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listening")
            .field("local_addr", &self.local_addr)
            .field("secure", &self.is_secure())
            .finish_non_exhaustive()
    }
}

/// Turn a host (IP literal or name) and port into a socket address
fn resolve_socket_addr(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let invalid = |reason: String| ServerError::InvalidAddress {
        addr: format!("{host}:{port}"),
        reason,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("host name resolved to no addresses".to_string()))
}
