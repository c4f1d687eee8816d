//! Shared mocks for the session peer integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use rvoip_jingle_core::prelude::*;

pub const LOCAL: &str = "juliet@capulet.lit/balcony";
pub const REMOTE: &str = "romeo@montague.lit/orchard";

/// Ordered record of collaborator calls across gateway and negotiator
#[derive(Debug, Default, Clone)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Gateway that keeps every message it was asked to send
pub struct RecordingGateway {
    journal: Journal,
    sent: Mutex<Vec<JingleMessage>>,
    fail_actions: Mutex<Vec<JingleAction>>,
}

impl RecordingGateway {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            sent: Mutex::new(Vec::new()),
            fail_actions: Mutex::new(Vec::new()),
        }
    }

    /// Make every later send of `action` fail
    pub fn fail_on(&self, action: JingleAction) {
        self.fail_actions.lock().push(action);
    }

    pub fn clear_failures(&self) {
        self.fail_actions.lock().clear();
    }

    pub fn sent(&self) -> Vec<JingleMessage> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl SignalingGateway for RecordingGateway {
    async fn send(&self, message: JingleMessage) -> Result<()> {
        if self.fail_actions.lock().contains(&message.action) {
            self.journal.record(format!("send-failed:{}", message.action));
            return Err(JingleError::delivery("connection reset"));
        }
        self.journal.record(format!("send:{}", message.action));
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Negotiator whose answers are configured by the test
pub struct ScriptedNegotiator {
    journal: Journal,
    pub offer_error: Mutex<Option<String>>,
    pub answer_error: Mutex<Option<String>>,
    pub local_contents: Mutex<Result<Vec<ContentDescriptor>>>,
    pub accept_contents: Mutex<Option<Vec<ContentDescriptor>>>,
    pub start_error: Mutex<Option<String>>,
    pub close_error: Mutex<Option<String>>,
}

impl ScriptedNegotiator {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            offer_error: Mutex::new(None),
            answer_error: Mutex::new(None),
            local_contents: Mutex::new(Ok(vec![voice()])),
            accept_contents: Mutex::new(Some(vec![voice()])),
            start_error: Mutex::new(None),
            close_error: Mutex::new(None),
        }
    }

    pub fn reject_offers(&self, reason: &str) {
        *self.offer_error.lock() = Some(reason.to_string());
    }

    pub fn reject_answers(&self, reason: &str) {
        *self.answer_error.lock() = Some(reason.to_string());
    }
}

fn scripted_failure(slot: &Mutex<Option<String>>) -> Result<()> {
    match slot.lock().as_ref() {
        Some(reason) => Err(JingleError::negotiation(reason.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl MediaNegotiator for ScriptedNegotiator {
    async fn process_offer(&self, offer: &[ContentDescriptor]) -> Result<()> {
        self.journal.record("process-offer");
        if offer.is_empty() {
            return Err(JingleError::negotiation("offer has no content"));
        }
        scripted_failure(&self.offer_error)
    }

    async fn process_answer(&self, _answer: &[ContentDescriptor]) -> Result<()> {
        self.journal.record("process-answer");
        scripted_failure(&self.answer_error)
    }

    async fn create_content_list(&self, _is_offer: bool) -> Result<Vec<ContentDescriptor>> {
        self.journal.record("create-content-list");
        match &*self.local_contents.lock() {
            Ok(contents) => Ok(contents.clone()),
            Err(e) => Err(JingleError::negotiation(e.cause())),
        }
    }

    async fn generate_session_accept(&self) -> Result<Vec<ContentDescriptor>> {
        self.journal.record("generate-session-accept");
        self.accept_contents
            .lock()
            .clone()
            .ok_or_else(|| JingleError::negotiation("no usable devices"))
    }

    async fn start(&self) -> Result<()> {
        self.journal.record("start");
        match self.start_error.lock().as_ref() {
            Some(reason) => Err(JingleError::negotiation(reason.clone())),
            None => Ok(()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.journal.record("close");
        match self.close_error.lock().as_ref() {
            Some(reason) => Err(JingleError::negotiation(reason.clone())),
            None => Ok(()),
        }
    }
}

pub fn voice() -> ContentDescriptor {
    ContentDescriptor::new(Creator::Initiator, "voice").with_senders(Senders::Both)
}

/// A session-initiate from the remote party to us
pub fn remote_initiate(sid: &str) -> JingleMessage {
    JingleMessage::session_initiate(REMOTE, LOCAL, SessionId::from(sid), vec![voice()])
}

pub struct Harness {
    pub peer: Arc<SessionPeer>,
    pub gateway: Arc<RecordingGateway>,
    pub negotiator: Arc<ScriptedNegotiator>,
    pub journal: Journal,
    pub events: mpsc::UnboundedReceiver<PeerEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PeerConfig::new(LOCAL))
    }

    pub fn with_config(config: PeerConfig) -> Self {
        let journal = Journal::default();
        let gateway = Arc::new(RecordingGateway::new(journal.clone()));
        let negotiator = Arc::new(ScriptedNegotiator::new(journal.clone()));
        let peer = Arc::new(SessionPeer::new(
            REMOTE,
            config,
            negotiator.clone(),
            gateway.clone(),
        ));
        let (listener, events) = ChannelListener::new();
        peer.add_listener(Arc::new(listener));

        Self {
            peer,
            gateway,
            negotiator,
            journal,
            events,
        }
    }

    /// Bring the peer into `Incoming` through a real inbound offer
    pub async fn incoming(sid: &str) -> Self {
        let harness = Self::new();
        harness
            .peer
            .process_session_initiate(remote_initiate(sid))
            .await
            .expect("inbound session-initiate");
        harness
    }

    /// Drain the notifications received so far
    pub fn drain_events(&mut self) -> Vec<PeerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Just the new states of the drained notifications
    pub fn drain_states(&mut self) -> Vec<CallPeerState> {
        self.drain_events()
            .into_iter()
            .filter_map(|event| match event {
                PeerEvent::StateChanged { new, .. } => Some(new),
                _ => None,
            })
            .collect()
    }
}
