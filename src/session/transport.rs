//! Establishing the single TCP connection of a session.

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::info;

/// A bound listening socket that accepts exactly one peer.
#[derive(Debug)]
pub struct PeerListener {
    listener: TcpListener,
}

impl PeerListener {
    /// Binds the listening socket. Bind errors surface here, before any
    /// session starts.
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection and closes the listening socket.
    pub async fn accept_one(self) -> io::Result<TcpStream> {
        let (stream, peer) = self.listener.accept().await?;
        info!(%peer, "accepted peer connection");
        Ok(stream)
    }
}

/// How a session obtains its connection.
#[derive(Debug)]
pub enum Role {
    /// Wait for one inbound connection on an already bound socket.
    Listen(PeerListener),
    /// Open one outbound connection.
    Dial { host: String, port: u16 },
}

impl Role {
    pub fn dial(host: impl Into<String>, port: u16) -> Self {
        Self::Dial {
            host: host.into(),
            port,
        }
    }
}

/// Produces the session's connection for `role`.
pub async fn establish(role: Role) -> io::Result<TcpStream> {
    let stream = match role {
        Role::Listen(listener) => listener.accept_one().await?,
        Role::Dial { host, port } => {
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            info!(%host, port, "connected to peer");
            stream
        }
    };
    stream.set_nodelay(true)?;
    Ok(stream)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_listener_and_dialer_connect() {
        let listener = PeerListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (accepted, dialed) = tokio::join!(
            establish(Role::Listen(listener)),
            establish(Role::dial("127.0.0.1", port))
        );
        let mut accepted = accepted.unwrap();
        let mut dialed = dialed.unwrap();

        dialed.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        accepted.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[tokio::test]
    async fn test_listener_stops_accepting_after_first_peer() {
        let listener = PeerListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (accepted, _first) = tokio::join!(
            establish(Role::Listen(listener)),
            TcpStream::connect(addr)
        );
        accepted.unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_dial_refused() {
        // Bind then drop to obtain a port nobody listens on
        let port = {
            let listener = PeerListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        assert!(establish(Role::dial("127.0.0.1", port)).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let first = PeerListener::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().unwrap();

        assert!(PeerListener::bind(addr).await.is_err());
    }
}
