//! Call peer lifecycle states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which hold sub-state a connected peer is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldState {
    /// We put the remote party on hold
    Local,
    /// The remote party put us on hold
    Remote,
    /// Both sides are holding
    Mutual,
}

/// Lifecycle state of a session peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallPeerState {
    Idle,
    /// We sent a session-initiate and wait for the remote side
    Initiating,
    /// A remote session-initiate was accepted for ringing
    Incoming,
    /// The remote side reported it is ringing
    AlertingRemote,
    Connecting,
    ConnectingWithEarlyMedia,
    Connected,
    OnHold(HoldState),
    Busy,
    Failed,
    Disconnected,
}

impl CallPeerState {
    pub fn is_on_hold(&self) -> bool {
        matches!(self, CallPeerState::OnHold(_))
    }

    /// States in which the session is over and media is released
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallPeerState::Busy | CallPeerState::Failed | CallPeerState::Disconnected
        )
    }

    /// States in which a remote session-accept is expected
    pub fn awaits_remote_answer(&self) -> bool {
        matches!(
            self,
            CallPeerState::Initiating
                | CallPeerState::AlertingRemote
                | CallPeerState::Connecting
                | CallPeerState::ConnectingWithEarlyMedia
        )
    }
}

impl Default for CallPeerState {
    fn default() -> Self {
        CallPeerState::Idle
    }
}

impl fmt::Display for CallPeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPeerState::Idle => write!(f, "Idle"),
            CallPeerState::Initiating => write!(f, "Initiating Call"),
            CallPeerState::Incoming => write!(f, "Incoming Call"),
            CallPeerState::AlertingRemote => write!(f, "Alerting Remote User"),
            CallPeerState::Connecting => write!(f, "Connecting"),
            CallPeerState::ConnectingWithEarlyMedia => write!(f, "Connecting with Early Media"),
            CallPeerState::Connected => write!(f, "Connected"),
            CallPeerState::OnHold(HoldState::Local) => write!(f, "Locally On Hold"),
            CallPeerState::OnHold(HoldState::Remote) => write!(f, "Remotely On Hold"),
            CallPeerState::OnHold(HoldState::Mutual) => write!(f, "Mutually On Hold"),
            CallPeerState::Busy => write!(f, "Busy"),
            CallPeerState::Failed => write!(f, "Failed"),
            CallPeerState::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Our role in the bound session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionRole {
    /// We sent the session-initiate
    Initiator,
    /// We received the session-initiate
    Responder,
}
