//! TCP transport provider for the linechat protocol
//!
//! Implements the core transport abstraction over plain TCP sockets. Peer
//! addresses are `host:port` strings; peer identity is derived from the
//! remote socket address.
//!
//! The secure/insecure variant distinction maps to two separately configured
//! listening addresses and nothing else: this crate does not terminate TLS.
//! A deployment that wants the secure variant to mean something is expected
//! to put the secure address behind a TLS-terminating proxy or tunnel; the
//! connection core treats the variant as observability-only either way.

use std::net::SocketAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use linechat_core::{
    BoxLinkStream, ListeningEndpoint, PeerAddr, PeerIdentity, SocketVariant, TransportError,
};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Listening addresses for the TCP transport, one per socket variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    /// Address the secure-variant listener binds to
    pub secure_addr: String,
    /// Address the insecure-variant listener binds to
    pub insecure_addr: String,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            secure_addr: "127.0.0.1:4850".to_string(),
            insecure_addr: "127.0.0.1:4851".to_string(),
        }
    }
}

impl TcpConfig {
    fn listen_addr(&self, variant: SocketVariant) -> &str {
        match variant {
            SocketVariant::Secure => &self.secure_addr,
            SocketVariant::Insecure => &self.insecure_addr,
        }
    }
}

// ----------------------------------------------------------------------------
// Transport Provider
// ----------------------------------------------------------------------------

/// TCP-backed [`linechat_core::TransportProvider`]
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    pub fn new(config: TcpConfig) -> Self {
        TcpTransport { config }
    }
}

#[async_trait]
impl linechat_core::TransportProvider for TcpTransport {
    async fn listen(
        &self,
        variant: SocketVariant,
    ) -> Result<Box<dyn ListeningEndpoint>, TransportError> {
        let addr = self.config.listen_addr(variant);
        let (endpoint, bound) = TcpEndpoint::bind(addr).await.map_err(|err| {
            TransportError::ListenFailed {
                variant: variant.to_string(),
                reason: err.to_string(),
            }
        })?;
        debug!(%variant, %bound, "tcp listener bound");
        Ok(Box::new(endpoint))
    }

    async fn dial(
        &self,
        peer: &PeerAddr,
        _variant: SocketVariant,
    ) -> Result<(BoxLinkStream, PeerIdentity), TransportError> {
        let stream =
            TcpStream::connect(peer.as_str())
                .await
                .map_err(|err| TransportError::DialFailed {
                    peer: peer.as_str().to_string(),
                    reason: err.to_string(),
                })?;
        let identity = identity_for(&stream, peer.as_str());
        let _ = stream.set_nodelay(true);
        Ok((Box::new(stream), identity))
    }
}

fn identity_for(stream: &TcpStream, fallback: &str) -> PeerIdentity {
    match stream.peer_addr() {
        Ok(addr) => PeerIdentity::new(addr.to_string(), addr.to_string()),
        Err(_) => PeerIdentity::new(fallback, fallback),
    }
}

// ----------------------------------------------------------------------------
// Listening Endpoint
// ----------------------------------------------------------------------------

/// One bound TCP listener; dropping it closes the socket
pub struct TcpEndpoint {
    listener: TcpListener,
}

impl TcpEndpoint {
    /// Bind `addr`, returning the endpoint and the actual bound address
    /// (useful with port 0)
    pub async fn bind(addr: &str) -> std::io::Result<(Self, SocketAddr)> {
        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;
        Ok((TcpEndpoint { listener }, bound))
    }
}

#[async_trait]
impl ListeningEndpoint for TcpEndpoint {
    async fn accept(&mut self) -> Result<(BoxLinkStream, PeerIdentity), TransportError> {
        let (stream, addr) = self.listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let identity = PeerIdentity::new(addr.to_string(), addr.to_string());
        Ok((Box::new(stream), identity))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use linechat_core::TransportProvider;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_accept_dial_roundtrip() {
        let (mut endpoint, bound) = TcpEndpoint::bind("127.0.0.1:0").await.unwrap();

        let transport = TcpTransport::new(TcpConfig::default());
        let (mut dialed, identity) = transport
            .dial(&PeerAddr::new(bound.to_string()), SocketVariant::Insecure)
            .await
            .unwrap();
        assert_eq!(identity.name, bound.to_string());

        let (mut accepted, _peer) = endpoint.accept().await.unwrap();

        dialed.write_all(b"ping\n").await.unwrap();
        let mut buf = [0u8; 5];
        accepted.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping\n");

        accepted.write_all(b"pong\r").await.unwrap();
        let mut buf = [0u8; 5];
        dialed.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong\r");
    }

    #[tokio::test]
    async fn test_dial_refused_is_dial_failed() {
        // Bind then immediately drop to get a port nobody is listening on
        let (endpoint, bound) = TcpEndpoint::bind("127.0.0.1:0").await.unwrap();
        drop(endpoint);

        let transport = TcpTransport::new(TcpConfig::default());
        let err = match transport
            .dial(&PeerAddr::new(bound.to_string()), SocketVariant::Secure)
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("expected dial to fail"),
        };
        assert!(matches!(err, TransportError::DialFailed { .. }));
    }

    #[tokio::test]
    async fn test_listen_on_taken_address_fails() {
        let (_endpoint, bound) = TcpEndpoint::bind("127.0.0.1:0").await.unwrap();
        let config = TcpConfig {
            secure_addr: bound.to_string(),
            insecure_addr: bound.to_string(),
        };
        let transport = TcpTransport::new(config);
        let err = match transport.listen(SocketVariant::Secure).await {
            Err(e) => e,
            Ok(_) => panic!("expected listen to fail"),
        };
        assert!(matches!(err, TransportError::ListenFailed { .. }));
    }
}
