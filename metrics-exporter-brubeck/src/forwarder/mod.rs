use std::{
    io,
    net::{SocketAddr, ToSocketAddrs as _},
    thread,
    time::Duration,
};

use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;

pub mod udp;
pub use self::udp::UdpTransport;

/// A write-only sink for formatted metric lines.
///
/// Each call to `send` carries exactly one metric line. Implementations are expected to be fire-and-forget: they must
/// not block on network conditions, and the client treats any error as a dropped line.
pub trait Transport: Send + Sync {
    /// Sends a single payload, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// If the payload could not be written, an error is returned. The client never propagates it.
    fn send(&self, payload: &[u8]) -> io::Result<usize>;
}

/// Errors that could occur while connecting to the remote server.
#[derive(Debug, Error)]
pub(crate) enum ConnectError {
    /// Failed to spawn the thread used to resolve the remote address.
    #[error("failed to spawn resolver thread: {0}")]
    Spawn(#[source] io::Error),

    /// Resolution did not complete within the connect timeout.
    #[error("timed out after {timeout:?} resolving remote address")]
    Timeout { timeout: Duration },

    /// The resolver thread exited without producing a result.
    #[error("resolver thread exited unexpectedly")]
    ResolverExited,

    /// The remote address could not be resolved.
    #[error("invalid remote address: {0}")]
    Resolve(#[source] io::Error),

    /// The remote address resolved to nothing.
    #[error("remote address did not resolve to any socket addresses")]
    NoAddresses,

    /// Failed to bind or connect the local socket.
    #[error("failed to set up socket: {0}")]
    Socket(#[source] io::Error),
}

/// Resolved remote address.
#[derive(Clone, Debug)]
pub(crate) struct RemoteAddr(Vec<SocketAddr>);

impl RemoteAddr {
    fn resolve(host: &str, port: u16) -> Result<Self, ConnectError> {
        let addrs = (host, port).to_socket_addrs().map_err(ConnectError::Resolve)?.collect::<Vec<_>>();
        if addrs.is_empty() {
            return Err(ConnectError::NoAddresses);
        }

        Ok(RemoteAddr(addrs))
    }

    /// Resolves `host:port`, giving up once `timeout` has elapsed.
    ///
    /// Name resolution can block for an unbounded amount of time, so it runs on a short-lived helper thread. On timeout
    /// the helper is left to finish on its own and its result is discarded.
    pub fn resolve_with_timeout(host: &str, port: u16, timeout: Duration) -> Result<Self, ConnectError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let host = host.to_string();

        thread::Builder::new()
            .name("metrics-exporter-brubeck-resolver".to_string())
            .spawn(move || {
                let _ = tx.send(RemoteAddr::resolve(&host, port));
            })
            .map_err(ConnectError::Spawn)?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ConnectError::Timeout { timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(ConnectError::ResolverExited),
        }
    }

    pub fn addrs(&self) -> &[SocketAddr] {
        &self.0
    }
}

/// Connects a UDP transport to `host:port`, bounded by `timeout`.
pub(crate) fn connect(host: &str, port: u16, timeout: Duration) -> Result<UdpTransport, ConnectError> {
    let remote_addr = RemoteAddr::resolve_with_timeout(host, port, timeout)?;
    UdpTransport::connect(&remote_addr)
}
