//! Two session peers talking through an in-memory gateway.
//!
//! Run with `RUST_LOG=debug cargo run --example loopback_call`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use rvoip_jingle_core::prelude::*;

const ALICE: &str = "alice@example.org/desk";
const BOB: &str = "bob@example.org/phone";

/// Delivers every message into the other side's inbox
struct LoopbackGateway {
    outbox: mpsc::UnboundedSender<JingleMessage>,
}

#[async_trait]
impl SignalingGateway for LoopbackGateway {
    async fn send(&self, message: JingleMessage) -> Result<()> {
        println!("  {} -> {}: {}", message.from, message.to, message.action);
        self.outbox
            .send(message)
            .map_err(|_| JingleError::delivery("remote inbox closed"))
    }
}

/// Accepts any non-empty offer and always offers one audio stream
struct AudioOnly;

#[async_trait]
impl MediaNegotiator for AudioOnly {
    async fn process_offer(&self, offer: &[ContentDescriptor]) -> Result<()> {
        if offer.is_empty() {
            return Err(JingleError::negotiation("offer has no content"));
        }
        Ok(())
    }

    async fn process_answer(&self, _answer: &[ContentDescriptor]) -> Result<()> {
        Ok(())
    }

    async fn create_content_list(&self, _is_offer: bool) -> Result<Vec<ContentDescriptor>> {
        Ok(vec![ContentDescriptor::new(Creator::Initiator, "audio").with_senders(Senders::Both)])
    }

    async fn generate_session_accept(&self) -> Result<Vec<ContentDescriptor>> {
        self.create_content_list(false).await
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }
}

struct PrintListener(&'static str);

impl PeerListener for PrintListener {
    fn on_peer_event(&self, event: &PeerEvent) {
        if let PeerEvent::StateChanged { new, .. } = event {
            println!("  [{}] {}", self.0, new);
        }
    }
}

fn peer(
    name: &'static str,
    local: &str,
    remote: &str,
    outbox: mpsc::UnboundedSender<JingleMessage>,
) -> Arc<SessionPeer> {
    let peer = SessionPeer::new(
        remote,
        PeerConfig::new(local),
        Arc::new(AudioOnly),
        Arc::new(LoopbackGateway { outbox }),
    );
    peer.add_listener(Arc::new(PrintListener(name)));
    Arc::new(peer)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (to_alice, mut alice_inbox) = mpsc::unbounded_channel();
    let (to_bob, mut bob_inbox) = mpsc::unbounded_channel();

    let alice = peer("alice", ALICE, BOB, to_bob);
    println!("alice calls bob");
    alice.initiate_session().await?;

    // Bob's peer is created by the arriving invitation
    let initiate = bob_inbox.recv().await.expect("session-initiate");
    let bob = peer("bob", BOB, &initiate.from, to_alice);
    bob.process_message(initiate).await?;

    let ringing = alice_inbox.recv().await.expect("ringing");
    alice.process_message(ringing).await?;

    println!("bob answers");
    bob.answer().await?;
    let accept = alice_inbox.recv().await.expect("session-accept");
    alice.process_message(accept).await?;

    println!("alice hangs up");
    alice.hangup().await;
    let bye = bob_inbox.recv().await.expect("session-terminate");
    bob.process_message(bye).await?;

    println!(
        "final states: alice={} bob={}",
        alice.state().await,
        bob.state().await
    );
    Ok(())
}
