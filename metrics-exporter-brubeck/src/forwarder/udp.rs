use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
};

use super::{ConnectError, RemoteAddr, Transport};

/// A connected, non-blocking UDP transport.
///
/// Every payload is sent as its own datagram. The socket is non-blocking, so a full send buffer surfaces as
/// [`io::ErrorKind::WouldBlock`] and the payload is dropped rather than stalling the caller.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    pub(crate) fn connect(remote_addr: &RemoteAddr) -> Result<Self, ConnectError> {
        let addrs = remote_addr.addrs();
        let local_addr = match addrs.first() {
            Some(SocketAddr::V6(_)) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
            Some(SocketAddr::V4(_)) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            None => return Err(ConnectError::NoAddresses),
        };

        UdpSocket::bind(local_addr)
            .and_then(|socket| {
                socket.connect(addrs)?;
                socket.set_nonblocking(true)?;
                Ok(UdpTransport { socket })
            })
            .map_err(ConnectError::Socket)
    }

    /// Returns the address of the remote server this transport sends to.
    ///
    /// # Errors
    ///
    /// If the underlying socket cannot report its peer, an error is returned.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }
}

impl Transport for UdpTransport {
    fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::{net::UdpSocket, time::Duration};

    use crate::forwarder::{RemoteAddr, Transport as _};

    use super::UdpTransport;

    #[test]
    fn sends_one_datagram_per_payload() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let port = receiver.local_addr().unwrap().port();

        let remote_addr =
            RemoteAddr::resolve_with_timeout("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        let transport = UdpTransport::connect(&remote_addr).unwrap();

        assert_eq!(transport.send(b"first:1|c").unwrap(), 9);
        assert_eq!(transport.send(b"second:2|c").unwrap(), 10);

        let mut buf = [0u8; 64];
        let len = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"first:1|c");
        let len = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"second:2|c");
    }
}
