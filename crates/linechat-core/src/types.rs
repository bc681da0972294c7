//! Fundamental types shared across the linechat crates

use std::fmt;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Connection State
// ----------------------------------------------------------------------------

/// Lifecycle state of the single logical connection.
///
/// Exactly one value holds at any instant; the orchestrator owns the only
/// mutable copy and every transition is announced through
/// [`LinkEvent::StateChanged`](crate::LinkEvent::StateChanged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Doing nothing; no workers are live
    Idle,
    /// Listening for an inbound peer
    Listening,
    /// An outbound dial attempt is in flight
    Connecting,
    /// A session with exactly one peer is established
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "Idle"),
            ConnectionState::Listening => write!(f, "Listening"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

// ----------------------------------------------------------------------------
// Socket Variant
// ----------------------------------------------------------------------------

/// Transport flavor requested from the provider.
///
/// Carried alongside streams for observability only; the core treats both
/// flavors identically. Securing the secure flavor is the provider's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketVariant {
    Secure,
    Insecure,
}

impl SocketVariant {
    /// All variants, in role-slot order
    pub const ALL: [SocketVariant; 2] = [SocketVariant::Secure, SocketVariant::Insecure];

    /// Stable slot index used by per-variant role tables
    pub fn index(self) -> usize {
        match self {
            SocketVariant::Secure => 0,
            SocketVariant::Insecure => 1,
        }
    }
}

impl fmt::Display for SocketVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketVariant::Secure => write!(f, "secure"),
            SocketVariant::Insecure => write!(f, "insecure"),
        }
    }
}

// ----------------------------------------------------------------------------
// Peer Addressing and Identity
// ----------------------------------------------------------------------------

/// Opaque reference to a peer we can dial.
///
/// The core never interprets the contents; the transport provider decides
/// what a valid address looks like (a host:port pair, a device address, a
/// registry key for in-process transports).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddr(pub String);

impl PeerAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        PeerAddr(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a connected peer, supplied by the transport on a successful
/// accept or dial. Ownership passes to the orchestrator at establishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentity {
    /// Stable identifier (transport-specific)
    pub id: String,
    /// Human-readable display name
    pub name: String,
}

impl PeerIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        PeerIdentity {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(format!("{}", ConnectionState::Idle), "Idle");
        assert_eq!(format!("{}", ConnectionState::Connected), "Connected");
    }

    #[test]
    fn test_variant_slot_indices_are_distinct() {
        assert_ne!(
            SocketVariant::Secure.index(),
            SocketVariant::Insecure.index()
        );
        for v in SocketVariant::ALL {
            assert_eq!(SocketVariant::ALL[v.index()], v);
        }
    }

    #[test]
    fn test_peer_identity_display_uses_name() {
        let peer = PeerIdentity::new("aa:bb:cc", "workbench");
        assert_eq!(format!("{}", peer), "workbench");
    }
}
