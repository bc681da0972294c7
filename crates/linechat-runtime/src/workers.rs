//! Worker task loops
//!
//! One async task per live role. Each loop owns the resource it blocks on,
//! performs all of its I/O outside the orchestrator lock, and reports
//! outcomes back through the orchestrator's internal entry points. None of
//! the loops restart themselves; recovery is always a transition the
//! orchestrator makes.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use linechat_core::{BoxLinkStream, FrameDecoder, LinkEvent, PeerAddr, SocketVariant};

use crate::orchestrator::ConnectionOrchestrator;

// ----------------------------------------------------------------------------
// Listener Worker
// ----------------------------------------------------------------------------

/// Accept inbound connections for one socket variant until cancelled.
///
/// Accepted streams are offered to the orchestrator; streams it does not
/// want (stopped, or already connected) are closed here and the loop keeps
/// going. An accept error ends the loop; only a fresh `start()` brings the
/// listener back.
pub(crate) async fn run_listener(orch: Arc<ConnectionOrchestrator>, variant: SocketVariant) {
    let mut endpoint = match orch.provider().listen(variant).await {
        Ok(endpoint) => endpoint,
        Err(err) => {
            warn!(%variant, %err, "failed to open listening endpoint");
            orch.notice(format!("Unable to listen for {variant} connections"));
            return;
        }
    };
    debug!(%variant, "listener accepting");

    loop {
        match endpoint.accept().await {
            Ok((stream, peer)) => {
                if let Some(stream) = orch.offer_inbound(stream, peer, variant) {
                    drop(stream);
                }
            }
            Err(err) => {
                debug!(%variant, %err, "accept loop ended");
                break;
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Connector Worker
// ----------------------------------------------------------------------------

/// Perform one outbound dial attempt.
///
/// Discovery is cancelled first because it competes with connection setup on
/// some transports. There is no retry here: a failed dial is reported and
/// the next attempt is the caller's `connect()`.
pub(crate) async fn run_connector(
    orch: Arc<ConnectionOrchestrator>,
    peer: PeerAddr,
    variant: SocketVariant,
) {
    debug!(%peer, %variant, "dialing");
    orch.provider().cancel_discovery().await;

    match orch.provider().dial(&peer, variant).await {
        Ok((stream, identity)) => {
            if let Some(stream) = orch.dial_succeeded(stream, identity, variant) {
                drop(stream);
            }
        }
        Err(err) => orch.connection_failed(&peer, &err),
    }
}

// ----------------------------------------------------------------------------
// Session Worker
// ----------------------------------------------------------------------------

/// Run the established session: frame inbound bytes, drain outbound writes.
///
/// Reads come in bounded chunks and go through the [`FrameDecoder`]; every
/// completed frame becomes a `MessageReceived` event. Outbound buffers
/// arrive over the session channel, are written in full, and echo back as
/// `MessageSent`. A write error is logged and swallowed; the read side is
/// what detects a dead session. A read error, EOF, or framing overflow ends
/// the session with exactly one loss report.
pub(crate) async fn run_session(
    orch: Arc<ConnectionOrchestrator>,
    session_id: u64,
    stream: BoxLinkStream,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    let events = orch.events();
    let mut decoder = FrameDecoder::new(orch.config().max_frame_len);
    let mut chunk = vec![0u8; orch.config().read_chunk_size];
    let (mut reader, mut writer) = tokio::io::split(stream);
    info!(session_id, "session worker running");

    loop {
        tokio::select! {
            read = reader.read(&mut chunk) => match read {
                Ok(0) => {
                    orch.connection_lost(session_id, "peer closed the connection");
                    break;
                }
                Ok(n) => match decoder.feed(&chunk[..n]) {
                    Ok(frames) => {
                        for bytes in frames {
                            let len = bytes.len();
                            let _ = events.send(LinkEvent::MessageReceived { bytes, len });
                        }
                    }
                    Err(err) => {
                        orch.connection_lost(session_id, &err.to_string());
                        break;
                    }
                },
                Err(err) => {
                    orch.connection_lost(session_id, &err.to_string());
                    break;
                }
            },
            Some(bytes) = outbound.recv() => {
                match writer.write_all(&bytes).await {
                    Ok(()) => {
                        let _ = events.send(LinkEvent::MessageSent { bytes });
                    }
                    Err(err) => warn!(session_id, %err, "write failed"),
                }
            }
        }
    }
    debug!(session_id, "session worker ended");
}
