//! Media negotiation seam
//!
//! The session peer never interprets codecs, transports or candidates itself.
//! It hands content lists to a [`MediaNegotiator`] and asks it for the lists
//! it must send, then tells it when media may start.

use async_trait::async_trait;

use crate::content::ContentDescriptor;
use crate::error::Result;

/// Translates content descriptors into and out of media transport setup
#[async_trait]
pub trait MediaNegotiator: Send + Sync {
    /// Process a remote offer.
    ///
    /// Fails with [`JingleError::Negotiation`](crate::JingleError::Negotiation)
    /// when nothing in the offer is usable, including an empty offer.
    async fn process_offer(&self, offer: &[ContentDescriptor]) -> Result<()>;

    /// Process the remote answer to an offer we sent
    async fn process_answer(&self, answer: &[ContentDescriptor]) -> Result<()>;

    /// Describe our local capabilities, as an offer when `is_offer` is set
    async fn create_content_list(&self, is_offer: bool) -> Result<Vec<ContentDescriptor>>;

    /// Build the contents of a session-accept for the processed offer
    async fn generate_session_accept(&self) -> Result<Vec<ContentDescriptor>>;

    /// Start media transport
    async fn start(&self) -> Result<()>;

    /// Release media resources once the session has ended
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
