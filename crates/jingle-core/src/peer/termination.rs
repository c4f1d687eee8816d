//! Hangup decision table
//!
//! Maps the state a peer was in before a local hangup onto the
//! session-terminate it owes the remote side.

use crate::message::{JingleMessage, Reason, SessionId};
use crate::state::CallPeerState;

/// Flavour of session-terminate sent on hangup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    /// End an established session
    Bye,
    /// Abandon a session the remote side has not answered
    Cancel,
    /// Reject a session we were offered
    Busy,
}

impl TerminationKind {
    pub fn reason(&self) -> Reason {
        match self {
            TerminationKind::Bye => Reason::Success,
            TerminationKind::Cancel => Reason::Cancel,
            TerminationKind::Busy => Reason::Busy,
        }
    }

    pub fn build(&self, from: &str, to: &str, sid: &SessionId) -> JingleMessage {
        match self {
            TerminationKind::Bye => JingleMessage::bye(from, to, sid),
            TerminationKind::Cancel => JingleMessage::cancel(from, to, sid),
            TerminationKind::Busy => JingleMessage::busy(from, to, sid),
        }
    }
}

/// What a hangup must signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HangupAction {
    Send(TerminationKind),
    /// The state already completed its own signaling
    AlreadySignaled,
    /// No terminate is defined for the state
    Inconsistent,
}

/// Decide the hangup signaling for the state held before the hangup
pub fn hangup_action(previous: CallPeerState) -> HangupAction {
    match previous {
        CallPeerState::Connected | CallPeerState::OnHold(_) => {
            HangupAction::Send(TerminationKind::Bye)
        }
        CallPeerState::Connecting
        | CallPeerState::ConnectingWithEarlyMedia
        | CallPeerState::AlertingRemote => HangupAction::Send(TerminationKind::Cancel),
        CallPeerState::Incoming => HangupAction::Send(TerminationKind::Busy),
        CallPeerState::Busy | CallPeerState::Failed => HangupAction::AlreadySignaled,
        CallPeerState::Idle | CallPeerState::Initiating | CallPeerState::Disconnected => {
            HangupAction::Inconsistent
        }
    }
}
