//! Linechat Core Protocol Implementation
//!
//! This crate provides the foundational types for the linechat peer-to-peer
//! connection protocol: connection state and peer identity types, the event
//! vocabulary delivered to the presentation layer, the line framing decoder,
//! and the transport abstraction the runtime orchestrates.
//!
//! The wire format is deliberately minimal: raw bytes terminated by an ASCII
//! line feed (0x0A) or carriage return (0x0D). Everything above that, such as
//! who we are connected to and how the connection came to be, is carried out-of-band
//! through [`LinkEvent`] values.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod error;
pub mod event;
pub mod framing;
pub mod memory;
pub mod transport;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::LinkConfig;
pub use error::{FramingError, TransportError};
pub use event::{event_channel, EventReceiver, EventSender, LinkEvent};
pub use framing::FrameDecoder;
pub use transport::{BoxLinkStream, LinkStream, ListeningEndpoint, TransportProvider};
pub use types::{ConnectionState, PeerAddr, PeerIdentity, SocketVariant};

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Umbrella error type for the linechat protocol crates
#[derive(Debug, thiserror::Error)]
pub enum LinechatError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = core::result::Result<T, LinechatError>;
