//! Error types for the linechat protocol
//!
//! Transport failures are never fatal to the orchestrator: they are caught at
//! the worker boundary, surfaced as a `Notice` event, and answered by a
//! return to listening. The types here exist so workers and transports can
//! still speak precisely about what went wrong.

// ----------------------------------------------------------------------------
// Transport Errors
// ----------------------------------------------------------------------------

/// Errors produced by transport providers and the streams they yield
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {variant} listening endpoint: {reason}")]
    ListenFailed { variant: String, reason: String },

    #[error("unable to connect to {peer}: {reason}")]
    DialFailed { peer: String, reason: String },

    #[error("endpoint closed")]
    EndpointClosed,

    #[error("no peer listening at {peer}")]
    PeerUnreachable { peer: String },
}

// ----------------------------------------------------------------------------
// Framing Errors
// ----------------------------------------------------------------------------

/// Errors produced by the line framing decoder
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FramingError {
    /// A delimiter-free run exceeded the accumulator capacity.
    ///
    /// The peer is not speaking the line protocol; the session is failed
    /// rather than silently resynchronized.
    #[error("frame exceeded {capacity} bytes without a delimiter")]
    Overflow { capacity: usize },
}
