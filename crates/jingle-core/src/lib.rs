//! # RVoIP Jingle Core
//!
//! Per-peer Jingle (XEP-0166) session negotiation for RVoIP.
//!
//! The crate tracks the bidirectional handshake of one call with one remote
//! party (session-initiate, ringing, session-accept, session-terminate) and
//! describes the negotiated content units. Delivery of messages and media
//! negotiation stay outside: they are reached through the
//! [`SignalingGateway`] and [`MediaNegotiator`] traits.
//!
//! ## Modules
//!
//! - [`content`] - content descriptors and their wire attributes
//! - [`message`] - Jingle messages, reasons and the message factory
//! - [`peer`] - the [`SessionPeer`] state machine
//! - [`state`] - call peer lifecycle states
//! - [`events`] - state and address change notifications
//! - [`config`] - peer configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rvoip_jingle_core::prelude::*;
//!
//! # async fn example(
//! #     negotiator: Arc<dyn MediaNegotiator>,
//! #     gateway: Arc<dyn SignalingGateway>,
//! # ) -> Result<()> {
//! let peer = SessionPeer::new(
//!     "juliet@capulet.lit/balcony",
//!     PeerConfig::new("romeo@montague.lit/orchard"),
//!     negotiator,
//!     gateway,
//! );
//!
//! peer.initiate_session().await?;
//! assert_eq!(peer.state().await, CallPeerState::Initiating);
//!
//! peer.hangup().await;
//! # Ok(())
//! # }
//! ```
//!
//! Diagnostics are emitted through `tracing`; the library never installs a
//! subscriber.

pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod events;
pub mod gateway;
pub mod message;
pub mod negotiator;
pub mod peer;
pub mod state;

pub use config::PeerConfig;
pub use contact::ContactDirectory;
pub use content::{ContentDescriptor, Creator, Senders, validate_content_list};
pub use error::{JingleError, Result};
pub use events::{ChannelListener, PeerEvent, PeerListener};
pub use gateway::SignalingGateway;
pub use message::{
    JingleAction, JingleMessage, Reason, SessionId, SessionInfo, TerminateReason,
};
pub use negotiator::MediaNegotiator;
pub use peer::SessionPeer;
pub use peer::termination::{HangupAction, TerminationKind, hangup_action};
pub use state::{CallPeerState, HoldState, SessionRole};

/// Commonly used types
pub mod prelude {
    pub use crate::{
        CallPeerState, ChannelListener, ContentDescriptor, Creator, HoldState, JingleAction,
        JingleError, JingleMessage, MediaNegotiator, PeerConfig, PeerEvent, PeerListener, Reason,
        Result, Senders, SessionId, SessionPeer, SessionRole, SignalingGateway,
    };
}
