//! Session peer state machine
//!
//! A [`SessionPeer`] is bound to one remote party and, once negotiation
//! starts, to exactly one Jingle session. It drives the handshake
//! (initiate, ringing, accept, terminate) through its two collaborators:
//!
//! ```text
//!            inbound JingleMessage                 local user actions
//!                      │                                   │
//!                      ▼                                   ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ SessionPeer  (one tokio Mutex per peer, held across awaits)  │
//!   │   state ── set via transition() ──► PeerListener callbacks   │
//!   └───────┬───────────────────────────────────────┬──────────────┘
//!           │ content lists, start/close            │ JingleMessage
//!           ▼                                       ▼
//!    MediaNegotiator                         SignalingGateway
//! ```
//!
//! Negotiation failures on inbound messages are answered with a
//! `session-terminate` (`incompatible-parameters`) and a move to
//! [`CallPeerState::Failed`]; they are not returned to the caller. Failures
//! of the local operations [`SessionPeer::initiate_session`] and
//! [`SessionPeer::answer`] are returned. [`SessionPeer::hangup`] never fails.

pub mod termination;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{Instrument, Span, debug, info, warn};

use crate::config::PeerConfig;
use crate::contact::ContactDirectory;
use crate::content::validate_content_list;
use crate::error::{JingleError, Result};
use crate::events::{PeerEvent, PeerListener};
use crate::gateway::SignalingGateway;
use crate::message::{JingleAction, JingleMessage, Reason, SessionId};
use crate::negotiator::MediaNegotiator;
use crate::state::{CallPeerState, SessionRole};

use self::termination::{HangupAction, hangup_action};

/// Session data guarded by the per-peer lock
#[derive(Debug)]
struct PeerInner {
    remote_address: String,
    /// The session-initiate that created the session, sent or received
    session_initiate: Option<JingleMessage>,
    role: Option<SessionRole>,
    state: CallPeerState,
}

impl PeerInner {
    fn sid(&self) -> Option<&SessionId> {
        self.session_initiate.as_ref().map(|m| &m.sid)
    }

    /// `(from, to)` for messages we send in the bound session
    fn route(&self) -> Option<(&str, &str)> {
        let initiate = self.session_initiate.as_ref()?;
        match self.role? {
            SessionRole::Initiator => Some((initiate.from.as_str(), initiate.to.as_str())),
            SessionRole::Responder => Some((initiate.to.as_str(), initiate.from.as_str())),
        }
    }

    /// Check that `message` belongs to the bound session
    fn check_session(&self, message: &JingleMessage) -> Result<()> {
        match self.sid() {
            Some(sid) if *sid == message.sid => Ok(()),
            Some(sid) => Err(JingleError::illegal_state(format!(
                "{} for session {} received by peer bound to {}",
                message.action, message.sid, sid
            ))),
            None => Err(JingleError::illegal_state(format!(
                "{} for session {} received before any session was bound",
                message.action, message.sid
            ))),
        }
    }
}

/// Jingle implementation of a call peer
pub struct SessionPeer {
    config: PeerConfig,
    negotiator: Arc<dyn MediaNegotiator>,
    gateway: Arc<dyn SignalingGateway>,
    contacts: Option<Arc<dyn ContactDirectory>>,
    inner: Mutex<PeerInner>,
    listeners: RwLock<Vec<Arc<dyn PeerListener>>>,
    span: Span,
}

impl SessionPeer {
    /// Create an idle peer for `remote_address`
    pub fn new(
        remote_address: impl Into<String>,
        config: PeerConfig,
        negotiator: Arc<dyn MediaNegotiator>,
        gateway: Arc<dyn SignalingGateway>,
    ) -> Self {
        let remote_address = remote_address.into();
        let span = tracing::info_span!(
            "session_peer",
            remote = %remote_address,
            sid = tracing::field::Empty
        );

        Self {
            config,
            negotiator,
            gateway,
            contacts: None,
            inner: Mutex::new(PeerInner {
                remote_address,
                session_initiate: None,
                role: None,
                state: CallPeerState::Idle,
            }),
            listeners: RwLock::new(Vec::new()),
            span,
        }
    }

    /// Use `contacts` to resolve display names
    pub fn with_contact_directory(mut self, contacts: Arc<dyn ContactDirectory>) -> Self {
        self.contacts = Some(contacts);
        self
    }

    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    /// Register a listener for state and address changes
    pub fn add_listener(&self, listener: Arc<dyn PeerListener>) {
        self.listeners.write().push(listener);
    }

    /// Remove a previously registered listener
    pub fn remove_listener(&self, listener: &Arc<dyn PeerListener>) {
        self.listeners.write().retain(|l| !Arc::ptr_eq(l, listener));
    }

    pub async fn state(&self) -> CallPeerState {
        self.inner.lock().await.state
    }

    /// Our role in the bound session, `None` while idle
    pub async fn role(&self) -> Option<SessionRole> {
        self.inner.lock().await.role
    }

    /// The remote party's address
    pub async fn address(&self) -> String {
        self.inner.lock().await.remote_address.clone()
    }

    /// Change the remote address, notifying listeners if it differs
    pub async fn set_address(&self, address: impl Into<String>) {
        let address = address.into();
        let mut inner = self.inner.lock().await;
        if inner.remote_address == address {
            return;
        }

        let old = std::mem::replace(&mut inner.remote_address, address.clone());
        self.span.in_scope(|| debug!("Remote address changed from {} to {}", old, address));
        self.notify(&PeerEvent::AddressChanged { old, new: address });
    }

    /// Contact display name for the remote address, falling back to the address
    pub async fn display_name(&self) -> String {
        let address = self.address().await;
        self.lookup_contact(&address).unwrap_or(address)
    }

    /// Contact display name for the remote address, if the directory knows it
    pub async fn contact_display_name(&self) -> Option<String> {
        let address = self.address().await;
        self.lookup_contact(&address)
    }

    fn lookup_contact(&self, address: &str) -> Option<String> {
        self.contacts.as_ref().and_then(|c| c.display_name(address))
    }

    /// Identifier of the bound session.
    ///
    /// Fails with [`JingleError::IllegalState`] until a session-initiate has
    /// been sent or received.
    pub async fn session_id(&self) -> Result<SessionId> {
        self.inner
            .lock()
            .await
            .sid()
            .cloned()
            .ok_or_else(|| JingleError::illegal_state("no Jingle session has been bound yet"))
    }

    /// The session-initiate that created the bound session
    pub async fn session_initiate(&self) -> Option<JingleMessage> {
        self.inner.lock().await.session_initiate.clone()
    }

    /// Move to `state`, for transitions driven by the owning call.
    ///
    /// Emits a state-change notification; does nothing when the peer is
    /// already in `state`.
    pub async fn set_state(&self, state: CallPeerState, reason: Option<String>) {
        async {
            let mut inner = self.inner.lock().await;
            if self.transition(&mut inner, state, reason) && state.is_terminal() {
                self.close_media().await;
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Dispatch an inbound message by its action
    pub async fn process_message(&self, message: JingleMessage) -> Result<()> {
        let action = message.action;
        match action {
            JingleAction::SessionInitiate => self.process_session_initiate(message).await,
            JingleAction::SessionInfo if message.is_ringing() => {
                self.process_ringing(&message).await
            }
            JingleAction::SessionInfo => {
                self.inner.lock().await.check_session(&message)?;
                self.span
                    .in_scope(|| debug!("Ignoring session-info without a known payload"));
                Ok(())
            }
            JingleAction::SessionAccept => self.process_session_accept(message).await,
            JingleAction::SessionTerminate => self.process_session_terminate(&message).await,
        }
    }

    /// Process the session-initiate this peer was created for.
    ///
    /// The offer is passed to the media negotiator. On success a ringing
    /// session-info is sent and the peer becomes [`CallPeerState::Incoming`].
    /// If negotiation fails the initiator receives a session-terminate with
    /// reason `incompatible-parameters`, the peer becomes
    /// [`CallPeerState::Failed`] and `Ok(())` is returned.
    ///
    /// Fails with [`JingleError::IllegalState`] if `session_initiate` is not a
    /// session-initiate or this peer already has a session.
    pub async fn process_session_initiate(&self, session_initiate: JingleMessage) -> Result<()> {
        async {
            let mut inner = self.inner.lock().await;
            if session_initiate.action != JingleAction::SessionInitiate {
                return Err(JingleError::illegal_state(format!(
                    "expected session-initiate, got {}",
                    session_initiate.action
                )));
            }
            if inner.session_initiate.is_some() || inner.state != CallPeerState::Idle {
                return Err(JingleError::illegal_state(format!(
                    "session-initiate {} received in state {}",
                    session_initiate.sid, inner.state
                )));
            }

            self.span.record("sid", tracing::field::display(&session_initiate.sid));
            inner.session_initiate = Some(session_initiate.clone());
            inner.role = Some(SessionRole::Responder);

            // Jingle sessions carry at least one content, so an empty offer is
            // left to the negotiator to reject.
            if let Err(e) = self.negotiator.process_offer(&session_initiate.contents).await {
                info!("Failed to process an incoming session initiate: {}", e);
                self.fail_session(
                    &mut inner,
                    &session_initiate.to,
                    &session_initiate.from,
                    &session_initiate.sid,
                    e,
                )
                .await;
                return Ok(());
            }

            if self.config.send_ringing {
                debug!("Will send ringing response for session {}", session_initiate.sid);
                let ringing = JingleMessage::ringing(&session_initiate);
                if let Err(e) = self.gateway.send(ringing).await {
                    warn!("Failed to send ringing for session {}: {}", session_initiate.sid, e);
                }
            }

            self.transition(&mut inner, CallPeerState::Incoming, None);
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Start a new outgoing session to the remote party.
    ///
    /// Fails with [`JingleError::Negotiation`] if no local offer can be
    /// produced, or with the gateway's error if the session-initiate cannot
    /// be delivered. The peer stays idle on failure.
    pub async fn initiate_session(&self) -> Result<()> {
        async {
            let mut inner = self.inner.lock().await;
            if inner.session_initiate.is_some() || inner.state != CallPeerState::Idle {
                return Err(JingleError::illegal_state(format!(
                    "cannot initiate a session in state {}",
                    inner.state
                )));
            }

            let offer = self.negotiator.create_content_list(true).await?;
            if offer.is_empty() {
                return Err(JingleError::negotiation("no content to offer"));
            }
            validate_content_list(&offer).map_err(|e| {
                JingleError::negotiation(format!("invalid local offer: {}", e.cause()))
            })?;

            let sid = self.gateway.generate_sid();
            let session_initiate = JingleMessage::session_initiate(
                &self.config.local_address,
                &inner.remote_address,
                sid,
                offer,
            );

            debug!(
                "Sending session-initiate {} with {} contents",
                session_initiate.sid,
                session_initiate.contents.len()
            );
            self.gateway.send(session_initiate.clone()).await?;

            self.span.record("sid", tracing::field::display(&session_initiate.sid));
            inner.session_initiate = Some(session_initiate);
            inner.role = Some(SessionRole::Initiator);
            self.transition(&mut inner, CallPeerState::Initiating, None);
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Accept the incoming session.
    ///
    /// The session-accept is sent before media is started, so the remote
    /// side sees it before our transport starts probing. The peer becomes
    /// [`CallPeerState::Connected`] once the accept is delivered.
    ///
    /// Fails with [`JingleError::IllegalState`] when there is no incoming
    /// session to answer, and with [`JingleError::OperationFailed`] when the
    /// accept cannot be generated or sent; the state is unchanged either way.
    pub async fn answer(&self) -> Result<()> {
        async {
            let mut inner = self.inner.lock().await;
            let session_initiate = match (&inner.session_initiate, inner.role, inner.state) {
                (Some(message), Some(SessionRole::Responder), CallPeerState::Incoming) => {
                    message.clone()
                }
                (None, _, state) => {
                    return Err(JingleError::illegal_state(format!(
                        "no incoming session to answer in state {}",
                        state
                    )));
                }
                (Some(_), _, state) => {
                    return Err(JingleError::illegal_state(format!(
                        "cannot answer in state {}",
                        state
                    )));
                }
            };

            let contents = match self.negotiator.generate_session_accept().await {
                Ok(contents) => contents,
                Err(e) => return Err(JingleError::operation_failed("answer", e)),
            };
            validate_content_list(&contents)
                .map_err(|e| JingleError::operation_failed("answer", e))?;

            let accept = JingleMessage::session_accept(
                &session_initiate.to,
                &session_initiate.from,
                &session_initiate.sid,
                contents,
            );
            self.gateway
                .send(accept)
                .await
                .map_err(|e| JingleError::operation_failed("answer", e))?;

            if let Err(e) = self.negotiator.start().await {
                warn!("Media start failed after accepting {}: {}", session_initiate.sid, e);
            }

            self.transition(&mut inner, CallPeerState::Connected, None);
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// End the call with this peer.
    ///
    /// Moves to [`CallPeerState::Disconnected`] and, depending on the state
    /// held before, sends a bye, cancel or busy session-terminate routed like
    /// the bound session-initiate. Does
    /// nothing if the peer is already disconnected or failed. Errors are
    /// logged, never returned.
    pub async fn hangup(&self) {
        async {
            let mut inner = self.inner.lock().await;
            if matches!(inner.state, CallPeerState::Disconnected | CallPeerState::Failed) {
                debug!(
                    "Ignoring a request to hangup a call peer that is already {}",
                    inner.state
                );
                return;
            }

            let previous = inner.state;
            self.transition(&mut inner, CallPeerState::Disconnected, None);

            match hangup_action(previous) {
                HangupAction::Send(kind) => match (inner.sid(), inner.route()) {
                    (Some(sid), Some((from, to))) => {
                        let message = kind.build(from, to, sid);
                        debug!("Sending {:?} session-terminate for {}", kind, sid);
                        if let Err(e) = self.gateway.send(message).await {
                            warn!("Failed to send {:?} session-terminate: {}", kind, e);
                        }
                    }
                    _ => {
                        warn!(
                            "Cannot send {:?} session-terminate from {}: no session bound",
                            kind, previous
                        );
                    }
                },
                HangupAction::AlreadySignaled => {
                    debug!("Hangup from {} needs no further signaling", previous);
                }
                HangupAction::Inconsistent => {
                    warn!(
                        "Could not determine call peer state! Hangup from {} sends nothing",
                        previous
                    );
                }
            }

            // Entering Busy already released media
            if !previous.is_terminal() {
                self.close_media().await;
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Handle a ringing session-info from the remote side
    pub async fn process_ringing(&self, message: &JingleMessage) -> Result<()> {
        async {
            let mut inner = self.inner.lock().await;
            inner.check_session(message)?;

            if inner.state == CallPeerState::Initiating {
                self.transition(&mut inner, CallPeerState::AlertingRemote, None);
            } else {
                debug!("Ignoring ringing in state {}", inner.state);
            }
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Handle the remote session-accept answering our session-initiate.
    ///
    /// Negotiation failures are handled like those of an inbound offer.
    pub async fn process_session_accept(&self, accept: JingleMessage) -> Result<()> {
        async {
            let mut inner = self.inner.lock().await;
            inner.check_session(&accept)?;
            if inner.role != Some(SessionRole::Initiator) || !inner.state.awaits_remote_answer() {
                return Err(JingleError::illegal_state(format!(
                    "session-accept received in state {}",
                    inner.state
                )));
            }

            if let Err(e) = self.negotiator.process_answer(&accept.contents).await {
                info!("Failed to process session-accept {}: {}", accept.sid, e);
                let (from, to) = match inner.route() {
                    Some((from, to)) => (from.to_string(), to.to_string()),
                    None => (self.config.local_address.clone(), inner.remote_address.clone()),
                };
                let sid = accept.sid.clone();
                self.fail_session(&mut inner, &from, &to, &sid, e).await;
                return Ok(());
            }

            if let Err(e) = self.negotiator.start().await {
                warn!("Media start failed for accepted session {}: {}", accept.sid, e);
            }
            self.transition(&mut inner, CallPeerState::Connected, None);
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Handle a session-terminate from the remote side
    pub async fn process_session_terminate(&self, terminate: &JingleMessage) -> Result<()> {
        async {
            let mut inner = self.inner.lock().await;
            inner.check_session(terminate)?;
            if inner.state.is_terminal() {
                debug!("Ignoring session-terminate in state {}", inner.state);
                return Ok(());
            }

            let reason = terminate.reason.as_ref().map(|r| match &r.text {
                Some(text) => format!("{}: {}", r.reason, text),
                None => r.reason.to_string(),
            });
            let next = match terminate.terminate_reason() {
                Some(Reason::Busy) => CallPeerState::Busy,
                _ => CallPeerState::Disconnected,
            };

            self.transition(&mut inner, next, reason);
            self.close_media().await;
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Terminate the session with `incompatible-parameters` and fail locally
    async fn fail_session(
        &self,
        inner: &mut PeerInner,
        from: &str,
        to: &str,
        sid: &SessionId,
        error: JingleError,
    ) {
        let cause = error.cause();
        let terminate = JingleMessage::session_terminate(
            from,
            to,
            sid,
            Reason::IncompatibleParameters,
            Some(cause.clone()),
        );
        if let Err(e) = self.gateway.send(terminate).await {
            warn!("Failed to send session-terminate for {}: {}", sid, e);
        }

        let reason = format!("{}{}", self.config.failure_reason_prefix, cause);
        self.transition(inner, CallPeerState::Failed, Some(reason));
        self.close_media().await;
    }

    /// The single state mutator; returns whether the state changed
    fn transition(
        &self,
        inner: &mut PeerInner,
        new_state: CallPeerState,
        reason: Option<String>,
    ) -> bool {
        let old = inner.state;
        if old == new_state {
            return false;
        }

        inner.state = new_state;
        info!("Call peer state: {} -> {}", old, new_state);
        self.notify(&PeerEvent::StateChanged {
            old,
            new: new_state,
            reason,
        });
        true
    }

    fn notify(&self, event: &PeerEvent) {
        for listener in self.listeners.read().iter() {
            listener.on_peer_event(event);
        }
    }

    async fn close_media(&self) {
        if let Err(e) = self.negotiator.close().await {
            warn!("Failed to close media: {}", e);
        }
    }
}
