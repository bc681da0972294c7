//! Pure connection state transition table
//!
//! Every command and every failure report is an [`Input`]; the table defines
//! an outcome for every (state, input) pair, so there is no such thing as a
//! state conflict. Keeping the restart-on-failure policy here (`DialFailed`
//! and `SessionLost` both land in `Listening`) makes the retry behavior
//! auditable separately from the code that detects the failures.

use linechat_core::ConnectionState;

/// Inputs driving the connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Input {
    /// `start()`: return to listening for inbound peers
    Start,
    /// `connect()`: begin an outbound dial attempt
    Connect,
    /// A stream and peer identity were committed as the active session
    Established,
    /// The outbound dial attempt failed
    DialFailed,
    /// The active session's read loop failed
    SessionLost,
    /// `stop()`: cancel everything
    Stop,
}

/// The transition table of the connection lifecycle
pub(crate) fn next_state(current: ConnectionState, input: Input) -> ConnectionState {
    match (current, input) {
        (_, Input::Start) => ConnectionState::Listening,
        (_, Input::Connect) => ConnectionState::Connecting,
        (_, Input::Established) => ConnectionState::Connected,
        (_, Input::DialFailed) => ConnectionState::Listening,
        (_, Input::SessionLost) => ConnectionState::Listening,
        (_, Input::Stop) => ConnectionState::Idle,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState::{Connected, Connecting, Idle, Listening};

    #[test]
    fn test_documented_transitions() {
        assert_eq!(next_state(Idle, Input::Start), Listening);
        assert_eq!(next_state(Listening, Input::Connect), Connecting);
        assert_eq!(next_state(Listening, Input::Established), Connected);
        assert_eq!(next_state(Connecting, Input::Connect), Connecting);
        assert_eq!(next_state(Connecting, Input::Established), Connected);
        assert_eq!(next_state(Connecting, Input::DialFailed), Listening);
        assert_eq!(next_state(Connected, Input::SessionLost), Listening);
        assert_eq!(next_state(Connected, Input::Connect), Connecting);
    }

    #[test]
    fn test_stop_is_terminal_from_every_state() {
        for state in [Idle, Listening, Connecting, Connected] {
            assert_eq!(next_state(state, Input::Stop), Idle);
        }
    }

    #[test]
    fn test_failures_always_recover_to_listening() {
        for state in [Idle, Listening, Connecting, Connected] {
            assert_eq!(next_state(state, Input::DialFailed), Listening);
            assert_eq!(next_state(state, Input::SessionLost), Listening);
        }
    }
}
