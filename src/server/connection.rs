// Connection module
// Serves HTTP/1.1 on one accepted stream (plain TCP or TLS)

use std::future::Future;
use std::io::{self, IoSlice};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Sleep;

use crate::handler::{BoxError, Dispatcher};
use crate::logger;

/// Tracks open connections against `performance.max_connections`
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    active: Arc<AtomicUsize>,
    max: Option<usize>,
}

impl ConnectionLimiter {
    pub fn new(max_connections: Option<u64>) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            max: max_connections.map(|m| usize::try_from(m).unwrap_or(usize::MAX)),
        }
    }

    /// Reserve a slot; `None` when the limit is reached
    pub fn try_acquire(&self) -> Option<ConnectionGuard> {
        // Increment first, then check, so concurrent accepts cannot overshoot
        let prev = self.active.fetch_add(1, Ordering::SeqCst);
        if let Some(max) = self.max {
            if prev >= max {
                self.active.fetch_sub(1, Ordering::SeqCst);
                logger::log_warning(&format!(
                    "Max connections reached: {prev}/{max}. Connection rejected."
                ));
                return None;
            }
        }
        Some(ConnectionGuard {
            active: Arc::clone(&self.active),
        })
    }
}

/// Releases its connection slot on drop
#[derive(Debug)]
pub struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Connection-level settings taken from `[performance]`
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    /// Bound on receiving a complete request head; `None` disables it
    pub header_read_timeout: Option<Duration>,
    /// Bound on a single write that makes no progress; `None` disables it
    pub write_timeout: Option<Duration>,
}

impl ConnectionSettings {
    pub fn from_state(dispatcher: &Dispatcher) -> Self {
        let perf = &dispatcher.state().config.performance;
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        Self {
            keep_alive: perf.keep_alive,
            header_read_timeout: secs(perf.read_timeout),
            write_timeout: secs(perf.write_timeout),
        }
    }
}

/// Serve requests on `io` until the peer closes or an error occurs
///
/// Responses are never cut off for taking long: only a slow request head or
/// a stalled write ends the connection early.
pub async fn serve_connection<I>(
    io: I,
    peer_addr: SocketAddr,
    dispatcher: Dispatcher,
    settings: ConnectionSettings,
) where
    I: AsyncRead + AsyncWrite + Unpin + 'static,
{
    let service = service_fn(move |req: Request<Incoming>| {
        let dispatcher = dispatcher.clone();
        async move {
            let req = req.map(|body| body.map_err(BoxError::from).boxed_unsync());
            dispatcher.handle(req, peer_addr).await
        }
    });

    let io = WriteTimeout::new(io, settings.write_timeout);
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .keep_alive(settings.keep_alive)
        .header_read_timeout(settings.header_read_timeout);

    if let Err(err) = builder.serve_connection(TokioIo::new(io), service).await {
        logger::log_connection_error(&err);
    }
}

/// Fails a write (or flush) that stays pending for longer than `limit`
///
/// The deadline restarts whenever the peer accepts data, so long transfers
/// to a slow but live reader are not affected.
struct WriteTimeout<I> {
    inner: I,
    limit: Option<Duration>,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl<I> WriteTimeout<I> {
    const fn new(inner: I, limit: Option<Duration>) -> Self {
        Self {
            inner,
            limit,
            deadline: None,
        }
    }

    fn on_write<T>(&mut self, cx: &mut Context<'_>, poll: Poll<io::Result<T>>) -> Poll<io::Result<T>> {
        if poll.is_ready() {
            self.deadline = None;
            return poll;
        }
        let Some(limit) = self.limit else {
            return Poll::Pending;
        };
        let deadline = self
            .deadline
            .get_or_insert_with(|| Box::pin(tokio::time::sleep(limit)));
        match deadline.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("write stalled for {} seconds", limit.as_secs()),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<I: AsyncRead + Unpin> AsyncRead for WriteTimeout<I> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<I: AsyncWrite + Unpin> AsyncWrite for WriteTimeout<I> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        this.on_write(cx, poll)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write_vectored(cx, bufs);
        this.on_write(cx, poll)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_flush(cx);
        this.on_write(cx, poll)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
