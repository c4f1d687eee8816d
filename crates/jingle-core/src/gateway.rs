//! Signaling delivery seam

use async_trait::async_trait;

use crate::error::Result;
use crate::message::{JingleMessage, SessionId};

/// Serializes and delivers Jingle messages to the network
#[async_trait]
pub trait SignalingGateway: Send + Sync {
    /// Deliver `message`.
    ///
    /// Fails with [`JingleError::Delivery`](crate::JingleError::Delivery) if it
    /// could not be sent. Sends are never retried by the caller.
    async fn send(&self, message: JingleMessage) -> Result<()>;

    /// Generate the identifier for a new outgoing session
    fn generate_sid(&self) -> SessionId {
        SessionId::generate()
    }
}
