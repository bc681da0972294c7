//! Event vocabulary delivered to the presentation layer
//!
//! All communication from the connection core to whatever sits above it (a
//! CLI, a TUI, a test harness) flows through immutable [`LinkEvent`] values
//! over an unbounded channel. Per-producer emission order is preserved; no
//! ordering is guaranteed across different worker tasks.

use tokio::sync::mpsc;

use crate::types::ConnectionState;

// ----------------------------------------------------------------------------
// LinkEvent: Connection Core → UI
// ----------------------------------------------------------------------------

/// Events emitted by the connection core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The connection lifecycle state changed
    StateChanged(ConnectionState),
    /// A session was established and the peer identified itself
    PeerIdentified { name: String },
    /// One delimiter-terminated message arrived from the peer.
    ///
    /// `len` counts every byte accumulated since the previous message,
    /// delimiter included, and always equals `bytes.len()`.
    MessageReceived { bytes: Vec<u8>, len: usize },
    /// Bytes were written to the peer (echo of a successful `write`)
    MessageSent { bytes: Vec<u8> },
    /// Human-readable notice (connection failed, connection lost)
    Notice(String),
}

// ----------------------------------------------------------------------------
// Channel Aliases
// ----------------------------------------------------------------------------

pub type EventSender = mpsc::UnboundedSender<LinkEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<LinkEvent>;

/// Create the event channel connecting the connection core to its consumer
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
