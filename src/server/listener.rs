//! TCP listener for the chat relay.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::Result;

/// Chat relay listener that accepts TCP connections.
///
/// Capacity is not enforced here: every pending connection is accepted,
/// and the relay loop closes it immediately when the client registry is
/// full. The rejected peer gets no notice, it simply sees the socket
/// close.
pub struct ChatListener {
    listener: TcpListener,
}

impl ChatListener {
    /// Create a new ChatListener bound to the configured address.
    ///
    /// Bind failure is fatal for the process; callers report it and exit.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        info!("Chat relay listening on {}", local_addr);

        Ok(Self { listener })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept one pending connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        debug!("Accepted connection from {}", addr);
        Ok((stream, addr))
    }
}
