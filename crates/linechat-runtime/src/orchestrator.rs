//! The connection orchestrator
//!
//! [`ConnectionOrchestrator`] manages the full lifecycle of one logical
//! peer-to-peer connection: listening for an inbound peer on up to two
//! socket variants, dialing an outbound one, and promoting exactly one
//! duplex stream to the active session. It owns at most one worker task per
//! role and serializes every state transition and handle swap under a single
//! lock, so the accept path and the dial path can race to establish a
//! session and exactly one wins.
//!
//! Blocking I/O never happens under the lock; it lives in the worker tasks
//! (see [`crate::workers`]). Failures are never fatal: a failed dial or a
//! lost session produces one `Notice` event and an automatic return to
//! listening.
//!
//! The orchestrator keeps its workers alive until told otherwise; call
//! [`stop`](ConnectionOrchestrator::stop) to tear everything down.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use linechat_core::{
    BoxLinkStream, ConnectionState, EventSender, LinkConfig, LinkEvent, PeerAddr, PeerIdentity,
    SocketVariant, TransportError, TransportProvider,
};

use crate::roles::{RoleSet, SessionHandle, WorkerHandle};
use crate::state::{next_state, Input};
use crate::workers;

// ----------------------------------------------------------------------------
// Orchestrator
// ----------------------------------------------------------------------------

/// Top-level state machine for the single logical connection
pub struct ConnectionOrchestrator {
    provider: Arc<dyn TransportProvider>,
    events: EventSender,
    config: LinkConfig,
    inner: Mutex<Inner>,
}

struct Inner {
    state: ConnectionState,
    roles: RoleSet,
    next_session_id: u64,
}

impl ConnectionOrchestrator {
    /// Create an orchestrator in the `Idle` state.
    ///
    /// Events are delivered through `events` in emission order per worker.
    pub fn new(
        provider: Arc<dyn TransportProvider>,
        config: LinkConfig,
        events: EventSender,
    ) -> Arc<Self> {
        Arc::new(ConnectionOrchestrator {
            provider,
            events,
            config,
            inner: Mutex::new(Inner {
                state: ConnectionState::Idle,
                roles: RoleSet::default(),
                next_session_id: 0,
            }),
        })
    }

    /// Current lifecycle state; safe to call from any thread
    pub fn current_state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Cancel any dial or session in progress and (re)start listening.
    ///
    /// Idempotent: listeners that are already accepting are left alone.
    pub fn start(self: &Arc<Self>) {
        let mut inner = self.lock();
        self.restart_locked(&mut inner, Input::Start);
    }

    /// Begin an outbound dial attempt to `peer`.
    ///
    /// Supersedes any dial already in flight and tears down any active
    /// session. Success routes to establishment; failure produces a `Notice`
    /// and an automatic return to listening.
    pub fn connect(self: &Arc<Self>, peer: PeerAddr, variant: SocketVariant) {
        debug!(%peer, %variant, "connect requested");
        let mut inner = self.lock();
        inner.roles.cancel_connector();
        inner.roles.cancel_session();
        let task = tokio::spawn(workers::run_connector(Arc::clone(self), peer, variant));
        inner.roles.install_connector(WorkerHandle::new(task));
        self.apply(&mut inner, Input::Connect);
    }

    /// Cancel every live worker and go `Idle`
    pub fn stop(&self) {
        info!("stopping connection core");
        let mut inner = self.lock();
        inner.roles.cancel_all();
        self.apply(&mut inner, Input::Stop);
    }

    /// Forward `bytes` to the active session.
    ///
    /// A write while not `Connected` is dropped silently, not queued and not an
    /// error. The actual stream write happens in the session worker, outside
    /// the orchestrator lock, and echoes a `MessageSent` event on success.
    pub fn write(&self, bytes: Vec<u8>) {
        let outbound = {
            let inner = self.lock();
            if inner.state != ConnectionState::Connected {
                return;
            }
            inner.roles.session_sender()
        };
        if let Some(tx) = outbound {
            if tx.send(bytes).is_err() {
                debug!("session outbound channel closed; write dropped");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Worker entry points (crate-internal)
    // ------------------------------------------------------------------------

    /// Accept path: a listener produced an inbound stream.
    ///
    /// Returns the stream back to the caller if the orchestrator no longer
    /// wants it (already connected, or stopped) so the listener can close it
    /// and keep looping.
    pub(crate) fn offer_inbound(
        self: &Arc<Self>,
        stream: BoxLinkStream,
        peer: PeerIdentity,
        variant: SocketVariant,
    ) -> Option<BoxLinkStream> {
        let mut inner = self.lock();
        match inner.state {
            ConnectionState::Listening | ConnectionState::Connecting => {
                self.established_locked(&mut inner, stream, peer, variant);
                None
            }
            ConnectionState::Idle | ConnectionState::Connected => {
                debug!(%variant, state = %inner.state, "discarding unwanted inbound stream");
                Some(stream)
            }
        }
    }

    /// Dial path: the connector's single attempt succeeded.
    ///
    /// Returns the stream back if `stop()` won the race against the dial.
    pub(crate) fn dial_succeeded(
        self: &Arc<Self>,
        stream: BoxLinkStream,
        peer: PeerIdentity,
        variant: SocketVariant,
    ) -> Option<BoxLinkStream> {
        let mut inner = self.lock();
        // The connector is done with itself either way
        inner.roles.clear_connector();
        if inner.state == ConnectionState::Idle {
            debug!(%variant, "dial completed after stop(); discarding stream");
            return Some(stream);
        }
        self.established_locked(&mut inner, stream, peer, variant);
        None
    }

    /// Dial path: the connector's single attempt failed
    pub(crate) fn connection_failed(self: &Arc<Self>, peer: &PeerAddr, err: &TransportError) {
        warn!(%peer, %err, "connection attempt failed");
        let mut inner = self.lock();
        inner.roles.clear_connector();
        if inner.state == ConnectionState::Idle {
            debug!("dial failed after stop(); staying idle");
            return;
        }
        let _ = self
            .events
            .send(LinkEvent::Notice(format!("Unable to connect to {peer}")));
        self.restart_locked(&mut inner, Input::DialFailed);
    }

    /// Session path: the read loop of session `session_id` failed.
    ///
    /// Reports from sessions that have already been superseded are ignored.
    pub(crate) fn connection_lost(self: &Arc<Self>, session_id: u64, reason: &str) {
        let mut inner = self.lock();
        if inner.roles.session_id() != Some(session_id) {
            debug!(session_id, reason, "ignoring loss report from stale session");
            return;
        }
        warn!(session_id, reason, "connection lost");
        inner.roles.clear_session();
        let _ = self
            .events
            .send(LinkEvent::Notice("Connection to peer was lost".to_string()));
        self.restart_locked(&mut inner, Input::SessionLost);
    }

    pub(crate) fn provider(&self) -> &Arc<dyn TransportProvider> {
        &self.provider
    }

    pub(crate) fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub(crate) fn events(&self) -> EventSender {
        self.events.clone()
    }

    pub(crate) fn notice(&self, text: String) {
        let _ = self.events.send(LinkEvent::Notice(text));
    }

    // ------------------------------------------------------------------------
    // Critical-section helpers
    // ------------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one transition table input and announce the resulting state
    fn apply(&self, inner: &mut Inner, input: Input) {
        let from = inner.state;
        inner.state = next_state(from, input);
        debug!(%from, to = %inner.state, ?input, "state transition");
        let _ = self.events.send(LinkEvent::StateChanged(inner.state));
    }

    /// Shared tail of `start()` and the two failure paths: drop outbound
    /// work, transition, and make sure a listener runs per enabled variant.
    fn restart_locked(self: &Arc<Self>, inner: &mut Inner, input: Input) {
        inner.roles.cancel_connector();
        inner.roles.cancel_session();
        self.apply(inner, input);
        for variant in SocketVariant::ALL {
            if !self.config.listens(variant) {
                continue;
            }
            let slot = inner.roles.listener_slot(variant);
            // A listener whose accept loop died is respawned; a live one is
            // left alone
            if slot.as_ref().is_none_or(WorkerHandle::is_finished) {
                debug!(%variant, "spawning listener");
                let task = tokio::spawn(workers::run_listener(Arc::clone(self), variant));
                *slot = Some(WorkerHandle::new(task));
            }
        }
    }

    /// Commit `stream`/`peer` as the single active session.
    ///
    /// Retires every other worker first: the session admits exactly one
    /// peer, so the listeners go down with the connector.
    fn established_locked(
        self: &Arc<Self>,
        inner: &mut Inner,
        stream: BoxLinkStream,
        peer: PeerIdentity,
        variant: SocketVariant,
    ) {
        info!(peer = %peer, %variant, "session established");
        inner.roles.cancel_connector();
        inner.roles.cancel_session();
        inner.roles.cancel_listeners();

        let session_id = inner.next_session_id;
        inner.next_session_id += 1;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(workers::run_session(
            Arc::clone(self),
            session_id,
            stream,
            outbound_rx,
        ));
        inner
            .roles
            .install_session(SessionHandle::new(session_id, task, outbound_tx));

        let _ = self
            .events
            .send(LinkEvent::PeerIdentified { name: peer.name });
        self.apply(inner, Input::Established);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
