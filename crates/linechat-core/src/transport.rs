//! Transport abstraction for the linechat connection core
//!
//! The core never opens sockets itself. It consumes an abstract provider
//! that can listen for inbound peers and dial outbound ones, yielding opaque
//! duplex byte streams plus the identity of the peer on the other end. This
//! keeps the orchestration logic independent of the concrete transport
//! (TCP, an in-process pipe, anything that can pose as a duplex stream).

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::TransportError;
use crate::types::{PeerAddr, PeerIdentity, SocketVariant};

// ----------------------------------------------------------------------------
// Duplex Streams
// ----------------------------------------------------------------------------

/// An abstract bidirectional byte stream.
///
/// Anything that is async-readable and async-writable qualifies; closing is
/// dropping (all supported transports close their resource on drop), with
/// `AsyncWriteExt::shutdown` available for a graceful half-close.
pub trait LinkStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> LinkStream for T {}

/// Owned, type-erased duplex stream as handed across the worker boundary
pub type BoxLinkStream = Box<dyn LinkStream>;

// ----------------------------------------------------------------------------
// Transport Provider
// ----------------------------------------------------------------------------

/// One listening endpoint, accepting inbound connections until dropped.
///
/// Dropping the endpoint closes it, which unblocks a pending `accept` in the
/// task that owns it; that is the only cancellation primitive the core uses.
#[async_trait]
pub trait ListeningEndpoint: Send {
    /// Block until the next inbound connection arrives
    async fn accept(&mut self) -> Result<(BoxLinkStream, PeerIdentity), TransportError>;
}

/// Factory for listening endpoints and outbound connections
#[async_trait]
pub trait TransportProvider: Send + Sync + 'static {
    /// Open a listening endpoint for the given variant
    async fn listen(
        &self,
        variant: SocketVariant,
    ) -> Result<Box<dyn ListeningEndpoint>, TransportError>;

    /// Perform one blocking dial attempt to the given peer
    async fn dial(
        &self,
        peer: &PeerAddr,
        variant: SocketVariant,
    ) -> Result<(BoxLinkStream, PeerIdentity), TransportError>;

    /// Stop any in-flight peer discovery the transport may be running.
    ///
    /// Called before every dial because discovery competes with connection
    /// setup on some transports. Default is a no-op.
    async fn cancel_discovery(&self) {}
}
