//! Worker-handle bookkeeping
//!
//! The orchestrator owns at most one live worker per role: one listener per
//! socket variant, one connector, one session. [`RoleSet`] holds those
//! handles and is only ever touched inside the orchestrator's critical
//! section, which is what makes "cancel old, install new, transition state"
//! atomic from the outside.
//!
//! Cancelling a worker aborts its task. The task owns the resource it blocks
//! on (listening endpoint or stream), so the abort drops and thereby closes
//! that resource; there is no cooperative cancellation flag to poll.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use linechat_core::SocketVariant;

// ----------------------------------------------------------------------------
// Worker Handles
// ----------------------------------------------------------------------------

/// Handle to a listener or connector task
pub(crate) struct WorkerHandle {
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        WorkerHandle { task }
    }

    /// Whether the worker's loop already terminated on its own
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub(crate) fn cancel(self) {
        self.task.abort();
    }
}

/// Handle to the active session worker
pub(crate) struct SessionHandle {
    /// Generation counter distinguishing this session from stale ones
    id: u64,
    task: JoinHandle<()>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl SessionHandle {
    pub(crate) fn new(id: u64, task: JoinHandle<()>, outbound: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        SessionHandle { id, task, outbound }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<Vec<u8>> {
        self.outbound.clone()
    }

    pub(crate) fn cancel(self) {
        self.task.abort();
    }
}

// ----------------------------------------------------------------------------
// Role Set
// ----------------------------------------------------------------------------

/// The orchestrator's worker handles, one optional slot per role
#[derive(Default)]
pub(crate) struct RoleSet {
    listeners: [Option<WorkerHandle>; 2],
    connector: Option<WorkerHandle>,
    session: Option<SessionHandle>,
}

impl RoleSet {
    pub(crate) fn listener_slot(&mut self, variant: SocketVariant) -> &mut Option<WorkerHandle> {
        &mut self.listeners[variant.index()]
    }

    /// Install a connector, cancelling any predecessor
    pub(crate) fn install_connector(&mut self, handle: WorkerHandle) {
        self.cancel_connector();
        self.connector = Some(handle);
    }

    /// Install a session, cancelling any predecessor
    pub(crate) fn install_session(&mut self, handle: SessionHandle) {
        self.cancel_session();
        self.session = Some(handle);
    }

    /// Release the connector slot without aborting the task.
    ///
    /// Used by the connector itself once its single dial attempt resolved.
    pub(crate) fn clear_connector(&mut self) {
        self.connector = None;
    }

    /// Release the session slot without aborting the task.
    ///
    /// Used by the session worker on its way out after a read failure.
    pub(crate) fn clear_session(&mut self) {
        self.session = None;
    }

    pub(crate) fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(SessionHandle::id)
    }

    pub(crate) fn session_sender(&self) -> Option<mpsc::UnboundedSender<Vec<u8>>> {
        self.session.as_ref().map(SessionHandle::sender)
    }

    pub(crate) fn cancel_connector(&mut self) {
        if let Some(handle) = self.connector.take() {
            handle.cancel();
        }
    }

    pub(crate) fn cancel_session(&mut self) {
        if let Some(handle) = self.session.take() {
            handle.cancel();
        }
    }

    pub(crate) fn cancel_listeners(&mut self) {
        for slot in &mut self.listeners {
            if let Some(handle) = slot.take() {
                handle.cancel();
            }
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        self.cancel_connector();
        self.cancel_session();
        self.cancel_listeners();
    }
}
