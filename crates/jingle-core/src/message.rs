//! Jingle session messages
//!
//! [`JingleMessage`] is the structured form of one Jingle IQ as exchanged
//! through a [`SignalingGateway`](crate::gateway::SignalingGateway). The
//! associated constructors form the message factory used by the session peer:
//! every message after the initial `session-initiate` echoes its session-id.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::content::ContentDescriptor;

/// Opaque Jingle session identifier
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh random session identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(sid: &str) -> Self {
        Self(sid.to_string())
    }
}

/// The Jingle `action` attribute
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JingleAction {
    SessionInitiate,
    SessionInfo,
    SessionAccept,
    SessionTerminate,
}

/// Reason conditions carried by `session-terminate`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Reason {
    AlternativeSession,
    Busy,
    Cancel,
    ConnectivityError,
    Decline,
    Expired,
    FailedApplication,
    FailedTransport,
    GeneralError,
    Gone,
    IncompatibleParameters,
    MediaError,
    SecurityError,
    Success,
    Timeout,
    UnsupportedApplications,
    UnsupportedTransports,
}

/// Reason element of a `session-terminate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminateReason {
    pub reason: Reason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Payload of a `session-info` message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SessionInfo {
    Ringing,
}

/// One Jingle message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JingleMessage {
    pub action: JingleAction,
    pub from: String,
    pub to: String,
    pub sid: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<TerminateReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<SessionInfo>,
}

impl JingleMessage {
    fn bare(action: JingleAction, from: &str, to: &str, sid: &SessionId) -> Self {
        Self {
            action,
            from: from.to_string(),
            to: to.to_string(),
            sid: sid.clone(),
            initiator: None,
            responder: None,
            contents: Vec::new(),
            reason: None,
            info: None,
        }
    }

    /// `session-initiate` offering `contents`
    pub fn session_initiate(
        from: &str,
        to: &str,
        sid: SessionId,
        contents: Vec<ContentDescriptor>,
    ) -> Self {
        let mut message = Self::bare(JingleAction::SessionInitiate, from, to, &sid);
        message.initiator = Some(from.to_string());
        message.contents = contents;
        message
    }

    /// `session-info` ringing reply to a received `session-initiate`
    pub fn ringing(session_initiate: &JingleMessage) -> Self {
        let mut message = Self::bare(
            JingleAction::SessionInfo,
            &session_initiate.to,
            &session_initiate.from,
            &session_initiate.sid,
        );
        message.info = Some(SessionInfo::Ringing);
        message
    }

    /// `session-accept` answering with `contents`
    pub fn session_accept(
        from: &str,
        to: &str,
        sid: &SessionId,
        contents: Vec<ContentDescriptor>,
    ) -> Self {
        let mut message = Self::bare(JingleAction::SessionAccept, from, to, sid);
        message.responder = Some(from.to_string());
        message.contents = contents;
        message
    }

    /// `session-terminate` with a reason condition and optional text
    pub fn session_terminate(
        from: &str,
        to: &str,
        sid: &SessionId,
        reason: Reason,
        text: Option<String>,
    ) -> Self {
        let mut message = Self::bare(JingleAction::SessionTerminate, from, to, sid);
        message.reason = Some(TerminateReason { reason, text });
        message
    }

    /// Terminate an established session
    pub fn bye(from: &str, to: &str, sid: &SessionId) -> Self {
        Self::session_terminate(from, to, sid, Reason::Success, None)
    }

    /// Abandon a session that has not been answered yet
    pub fn cancel(from: &str, to: &str, sid: &SessionId) -> Self {
        Self::session_terminate(from, to, sid, Reason::Cancel, None)
    }

    /// Reject an incoming session
    pub fn busy(from: &str, to: &str, sid: &SessionId) -> Self {
        Self::session_terminate(from, to, sid, Reason::Busy, None)
    }

    pub fn is_ringing(&self) -> bool {
        self.action == JingleAction::SessionInfo && self.info == Some(SessionInfo::Ringing)
    }

    /// The reason condition of a `session-terminate`
    pub fn terminate_reason(&self) -> Option<Reason> {
        self.reason.as_ref().map(|r| r.reason)
    }
}
