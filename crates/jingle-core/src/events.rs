//! Session peer change notifications
//!
//! Listeners are called synchronously while the peer still holds its session
//! lock, so a listener observes transitions in the order they happened. A
//! listener must not call back into the peer that notified it.

use tokio::sync::mpsc;

use crate::state::CallPeerState;

/// A change reported by a [`SessionPeer`](crate::peer::SessionPeer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// The peer moved between lifecycle states
    StateChanged {
        old: CallPeerState,
        new: CallPeerState,
        reason: Option<String>,
    },
    /// The remote address of the peer changed
    AddressChanged { old: String, new: String },
}

/// Observer of peer changes
pub trait PeerListener: Send + Sync {
    fn on_peer_event(&self, event: &PeerEvent);
}

/// Listener that forwards every event into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    event_tx: mpsc::UnboundedSender<PeerEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PeerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }
}

impl PeerListener for ChannelListener {
    fn on_peer_event(&self, event: &PeerEvent) {
        // The receiver going away only means nobody is interested anymore
        let _ = self.event_tx.send(event.clone());
    }
}
