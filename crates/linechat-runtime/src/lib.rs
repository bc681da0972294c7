//! Linechat Runtime
//!
//! The concurrent machinery of the linechat connection core: the
//! [`ConnectionOrchestrator`] state machine, its per-role worker tasks, and
//! the transition table that ties every failure path back to a defined
//! recovery. The orchestrator is the only type external callers interact
//! with; workers report back through internal calls, never across role
//! boundaries.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod orchestrator;

mod roles;
mod state;
mod workers;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use orchestrator::ConnectionOrchestrator;
