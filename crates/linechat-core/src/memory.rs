//! In-process memory transport
//!
//! A [`TransportProvider`] backed by `tokio::io::duplex` pipes and a shared
//! registry of listeners. Several transports attached to one [`MemoryNet`]
//! can listen for and dial each other by registry id, which is exactly what
//! the orchestration tests need: real concurrency, no real sockets, and
//! enough observability to verify that cancelled workers released their
//! endpoints.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::{BoxLinkStream, ListeningEndpoint, TransportProvider};
use crate::types::{PeerAddr, PeerIdentity, SocketVariant};

/// Buffer size of each in-process duplex pipe
const PIPE_CAPACITY: usize = 64 * 1024;

type Inbound = (BoxLinkStream, PeerIdentity);
type ListenerKey = (String, SocketVariant);

// ----------------------------------------------------------------------------
// Memory Network Registry
// ----------------------------------------------------------------------------

/// Shared registry connecting the memory transports of one test/demo world
#[derive(Default)]
pub struct MemoryNet {
    listeners: Mutex<HashMap<ListenerKey, (mpsc::UnboundedSender<Inbound>, PeerIdentity)>>,
}

impl MemoryNet {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryNet::default())
    }

    /// Number of currently registered listening endpoints
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<ListenerKey, (mpsc::UnboundedSender<Inbound>, PeerIdentity)>>
    {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ----------------------------------------------------------------------------
// Memory Transport
// ----------------------------------------------------------------------------

/// One endpoint identity on a [`MemoryNet`]
pub struct MemoryTransport {
    net: Arc<MemoryNet>,
    local: PeerIdentity,
}

impl MemoryTransport {
    pub fn new(net: Arc<MemoryNet>, local: PeerIdentity) -> Self {
        MemoryTransport { net, local }
    }

    /// The identity this transport announces to peers
    pub fn local_identity(&self) -> &PeerIdentity {
        &self.local
    }
}

#[async_trait]
impl TransportProvider for MemoryTransport {
    async fn listen(
        &self,
        variant: SocketVariant,
    ) -> Result<Box<dyn ListeningEndpoint>, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let key = (self.local.id.clone(), variant);
        self.net
            .lock()
            .insert(key.clone(), (tx.clone(), self.local.clone()));
        Ok(Box::new(MemoryEndpoint {
            rx,
            tx,
            key,
            net: Arc::clone(&self.net),
        }))
    }

    async fn dial(
        &self,
        peer: &PeerAddr,
        variant: SocketVariant,
    ) -> Result<(BoxLinkStream, PeerIdentity), TransportError> {
        let (listener_tx, listener_identity) = self
            .net
            .lock()
            .get(&(peer.as_str().to_string(), variant))
            .cloned()
            .ok_or_else(|| TransportError::PeerUnreachable {
                peer: peer.as_str().to_string(),
            })?;

        let (ours, theirs) = tokio::io::duplex(PIPE_CAPACITY);
        listener_tx
            .send((Box::new(theirs), self.local.clone()))
            .map_err(|_| TransportError::PeerUnreachable {
                peer: peer.as_str().to_string(),
            })?;
        Ok((Box::new(ours), listener_identity))
    }
}

// ----------------------------------------------------------------------------
// Memory Endpoint
// ----------------------------------------------------------------------------

struct MemoryEndpoint {
    rx: mpsc::UnboundedReceiver<Inbound>,
    /// Kept so Drop can tell whether the registry entry is still ours
    tx: mpsc::UnboundedSender<Inbound>,
    key: ListenerKey,
    net: Arc<MemoryNet>,
}

#[async_trait]
impl ListeningEndpoint for MemoryEndpoint {
    async fn accept(&mut self) -> Result<(BoxLinkStream, PeerIdentity), TransportError> {
        self.rx.recv().await.ok_or(TransportError::EndpointClosed)
    }
}

impl Drop for MemoryEndpoint {
    fn drop(&mut self) {
        let mut listeners = self.net.lock();
        // A newer endpoint may have replaced us under the same key
        if listeners
            .get(&self.key)
            .is_some_and(|(tx, _)| tx.same_channel(&self.tx))
        {
            listeners.remove(&self.key);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn transport(net: &Arc<MemoryNet>, id: &str) -> MemoryTransport {
        MemoryTransport::new(Arc::clone(net), PeerIdentity::new(id, id))
    }

    #[tokio::test]
    async fn test_dial_without_listener_fails() {
        let net = MemoryNet::new();
        let alice = transport(&net, "alice");
        let err = match alice
            .dial(&PeerAddr::new("bob"), SocketVariant::Insecure)
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("expected dial to fail"),
        };
        assert!(matches!(err, TransportError::PeerUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_listen_dial_roundtrip() {
        let net = MemoryNet::new();
        let alice = transport(&net, "alice");
        let bob = transport(&net, "bob");

        let mut endpoint = bob.listen(SocketVariant::Secure).await.unwrap();
        let (mut dialed, bob_identity) = alice
            .dial(&PeerAddr::new("bob"), SocketVariant::Secure)
            .await
            .unwrap();
        assert_eq!(bob_identity.name, "bob");

        let (mut accepted, alice_identity) = endpoint.accept().await.unwrap();
        assert_eq!(alice_identity.name, "alice");

        dialed.write_all(b"hi\n").await.unwrap();
        let mut buf = [0u8; 3];
        accepted.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi\n");
    }

    #[tokio::test]
    async fn test_dropping_endpoint_unregisters() {
        let net = MemoryNet::new();
        let bob = transport(&net, "bob");
        let endpoint = bob.listen(SocketVariant::Insecure).await.unwrap();
        assert_eq!(net.listener_count(), 1);
        drop(endpoint);
        assert_eq!(net.listener_count(), 0);

        let alice = transport(&net, "alice");
        assert!(alice
            .dial(&PeerAddr::new("bob"), SocketVariant::Insecure)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_variants_are_separate_listeners() {
        let net = MemoryNet::new();
        let bob = transport(&net, "bob");
        let _secure = bob.listen(SocketVariant::Secure).await.unwrap();
        let alice = transport(&net, "alice");
        assert!(alice
            .dial(&PeerAddr::new("bob"), SocketVariant::Insecure)
            .await
            .is_err());
        assert!(alice
            .dial(&PeerAddr::new("bob"), SocketVariant::Secure)
            .await
            .is_ok());
    }
}
