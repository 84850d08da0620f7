use crate::application::config::SessionConfig;
use crate::application::observers::{Observers, SubscriptionId};
use crate::application::router::{self, RouteDecision};
use crate::application::status::{Connection, ConnectionState, ConnectionStatus, SessionState};
use crate::domain::PeerId;
use crate::error::{Result, SessionError};
use crate::infrastructure::platform::platform_sleep;
use crate::infrastructure::{
    ConnectionEvent, Delivery, MatchboxConnectionFactory, MemoryConnectionFactory, MemoryNetwork,
    NetworkConnection,
};
use crate::signaling::{ManualSignaling, RoomCodeSignaling, SignalingExchange};
use instant::{Duration, Instant};
use robo_session_core::{
    EnemyPublisher, EnemySyncState, LifecycleCoordinator, LifecycleEvent, MessageCategory,
    MessageKind, MessagePayload, NetworkMessage, Participant, ParticipantId, PausableClock,
    PlayerPublisher, PlayerState, ReplicaStore, Role, Roster, SystemTimeSource, TimeSource,
    Vec2,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Session over matchbox with room-code invites
pub type MatchboxSessionManager = SessionManager<RoomCodeSignaling<MatchboxConnectionFactory>>;

/// Session over matchbox with copy-paste offer/answer blobs
pub type ManualSessionManager = SessionManager<ManualSignaling<MatchboxConnectionFactory>>;

/// Session on an in-process [`MemoryNetwork`]
pub type MemorySessionManager = SessionManager<RoomCodeSignaling<MemoryConnectionFactory>>;

fn delivery_for(kind: MessageKind) -> Delivery {
    match kind.category() {
        MessageCategory::Replication => Delivery::Unreliable,
        MessageCategory::Roster | MessageCategory::Lifecycle => Delivery::Reliable,
    }
}

/// One participant's view of a star-topology session.
///
/// The host holds a channel to every guest and relays guest traffic;
/// guests only ever talk to the host. Everything is driven from the
/// caller's loop through [`SessionManager::poll`].
pub struct SessionManager<S: SignalingExchange> {
    config: SessionConfig,
    signaling: S,
    transport: Option<S::Connection>,
    role: Option<Role>,
    state: SessionState,
    status: ConnectionStatus,
    local_peer: Option<PeerId>,
    local_id: Option<ParticipantId>,
    host_peer: Option<PeerId>,
    display_name: Option<String>,
    connections: HashMap<PeerId, Connection>,
    /// Peers on the transport whose answer has not been applied yet
    pending: HashSet<PeerId>,
    authorized: HashSet<PeerId>,
    invite: Option<String>,
    answer: Option<String>,
    handshake_failure: Option<SessionError>,
    roster: Roster,
    replicas: ReplicaStore,
    lifecycle: LifecycleCoordinator,
    player_publisher: PlayerPublisher,
    enemy_publisher: EnemyPublisher,
    observers: Observers,
}

impl SessionManager<RoomCodeSignaling<MatchboxConnectionFactory>> {
    pub fn matchbox(config: SessionConfig) -> Self {
        let signaling = RoomCodeSignaling::new(
            MatchboxConnectionFactory,
            config.signalling_server.clone(),
            config.ice_servers.clone(),
        );
        Self::new(signaling, config)
    }
}

impl SessionManager<ManualSignaling<MatchboxConnectionFactory>> {
    pub fn manual(config: SessionConfig) -> Self {
        let signaling = ManualSignaling::new(
            MatchboxConnectionFactory,
            config.signalling_server.clone(),
            config.ice_servers.clone(),
        );
        Self::new(signaling, config)
    }
}

impl SessionManager<RoomCodeSignaling<MemoryConnectionFactory>> {
    pub fn in_memory(network: MemoryNetwork, config: SessionConfig) -> Self {
        let signaling = RoomCodeSignaling::new(
            MemoryConnectionFactory::new(network),
            config.signalling_server.clone(),
            config.ice_servers.clone(),
        );
        Self::new(signaling, config)
    }
}

impl<S: SignalingExchange> SessionManager<S> {
    pub fn new(signaling: S, config: SessionConfig) -> Self {
        Self::with_time_source(signaling, config, Arc::new(SystemTimeSource::new()))
    }

    /// Use a custom clock for game time (tests, replays)
    pub fn with_time_source(
        signaling: S,
        config: SessionConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let replication = config.replication.clone();
        let lifecycle =
            LifecycleCoordinator::new(PausableClock::new(time), replication.game_duration_ms());

        Self {
            display_name: config.display_name.clone(),
            signaling,
            transport: None,
            role: None,
            state: SessionState::Idle,
            status: ConnectionStatus::Disconnected,
            local_peer: None,
            local_id: None,
            host_peer: None,
            connections: HashMap::new(),
            pending: HashSet::new(),
            authorized: HashSet::new(),
            invite: None,
            answer: None,
            handshake_failure: None,
            roster: Roster::new(),
            replicas: ReplicaStore::new(replication.interpolation_window_ms()),
            lifecycle,
            player_publisher: PlayerPublisher::new(replication.player_update_interval),
            enemy_publisher: EnemyPublisher::new(replication.enemy_sync_interval),
            observers: Observers::new(),
            config,
        }
    }

    // ===== Establishment =====

    /// Open a session as host and return the invite to share.
    ///
    /// Calling again while the session is live returns the same invite.
    pub async fn init_as_host(&mut self) -> Result<String> {
        if let Some(invite) = &self.invite {
            return Ok(invite.clone());
        }
        self.ensure_idle()?;

        let name = match &self.display_name {
            Some(name) => {
                Participant::validate_name(name)?;
                name.clone()
            }
            None => Participant::default_name(0),
        };

        tracing::info!("🎯 Initializing session as HOST");
        self.set_state(SessionState::Initializing);
        self.set_status(ConnectionStatus::Connecting);

        let offer = match self.signaling.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                tracing::error!("❌ Failed to create offer: {}", e);
                self.abort_establishment();
                return Err(e);
            }
        };

        let Some(local_peer) = offer.connection.local_peer_id() else {
            self.abort_establishment();
            return Err(SessionError::Signaling("transport has no peer id".to_string()));
        };

        if let Err(e) = Participant::new_host(local_peer.participant_id(), name)
            .map_err(SessionError::from)
            .and_then(|host| self.roster.insert(host).map_err(SessionError::from))
        {
            self.abort_establishment();
            return Err(e);
        }

        self.transport = Some(offer.connection);
        self.role = Some(Role::Host);
        self.set_local(local_peer);
        self.invite = Some(offer.blob.clone());

        tracing::info!("🟢 HOST: Ready as {}, waiting for guests", local_peer);
        self.set_state(SessionState::AwaitingGuests);
        self.set_status(ConnectionStatus::Connected);
        self.observers.notify_roster(&self.roster);

        Ok(offer.blob)
    }

    /// Join the host described by `offer` and return the answer blob
    /// (empty when the signaling has no answer step).
    pub async fn join_as_guest(&mut self, offer: &str) -> Result<String> {
        if let Some(answer) = &self.answer {
            return Ok(answer.clone());
        }
        self.ensure_idle()?;

        if let Some(name) = &self.display_name {
            Participant::validate_name(name)?;
        }

        tracing::info!("🎯 Joining session as GUEST");
        self.set_state(SessionState::Initializing);
        self.set_status(ConnectionStatus::Connecting);

        let answer = match self.signaling.create_answer(offer).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("❌ Failed to answer offer: {}", e);
                self.abort_establishment();
                return Err(e);
            }
        };

        let Some(local_peer) = answer.connection.local_peer_id() else {
            self.abort_establishment();
            return Err(SessionError::Signaling("transport has no peer id".to_string()));
        };

        self.transport = Some(answer.connection);
        self.role = Some(Role::Guest);
        self.host_peer = Some(answer.host);
        self.connections
            .insert(answer.host, Connection::connecting(answer.host));
        self.set_local(local_peer);
        self.answer = Some(answer.blob.clone());

        tracing::info!("🟡 GUEST: {} waiting for host {}", local_peer, answer.host);
        self.set_state(SessionState::AwaitingHostAck);

        Ok(answer.blob)
    }

    /// Host only: accept a guest's answer blob
    pub fn apply_answer(&mut self, answer: &str) -> Result<()> {
        if self.role != Some(Role::Host) {
            return Err(SessionError::InvalidState(
                "only the host applies answers".to_string(),
            ));
        }

        if let Some(peer) = self.signaling.apply_answer(answer)? {
            tracing::info!("🔑 HOST: Answer applied for {}", peer);
            self.authorized.insert(peer);
            if self.pending.remove(&peer) {
                self.admit(peer);
            }
        }
        Ok(())
    }

    /// Drive the transport until the session is `Active`.
    ///
    /// Fails with the recorded cause when the handshake is rejected, or
    /// with [`SessionError::ConnectionTimeout`] after the configured
    /// handshake timeout.
    pub async fn await_handshake(&mut self) -> Result<()> {
        let timeout = self.config.handshake_timeout;
        let started = Instant::now();

        loop {
            self.poll();

            if let Some(failure) = self.handshake_failure.take() {
                return Err(failure);
            }

            match self.state {
                SessionState::Active => return Ok(()),
                SessionState::AwaitingGuests | SessionState::AwaitingHostAck => {}
                _ => return Err(SessionError::NotConnected),
            }

            if started.elapsed() >= timeout {
                tracing::warn!("⏰ Handshake timed out after {:?}", timeout);
                if self.role == Some(Role::Guest) {
                    self.drop_session();
                }
                return Err(SessionError::ConnectionTimeout(timeout.as_millis() as u64));
            }

            platform_sleep(self.config.poll_interval()).await;
        }
    }

    // ===== Event pump =====

    /// Process pending transport events. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let Some(transport) = self.transport.as_mut() else {
            return 0;
        };

        let events = transport.poll_events();
        let count = events.len();

        for event in events {
            match event {
                ConnectionEvent::PeerConnected(peer) => self.handle_peer_connected(peer),
                ConnectionEvent::PeerDisconnected(peer) => self.handle_peer_disconnected(peer),
                ConnectionEvent::MessageReceived { from, data } => self.handle_message(from, data),
                ConnectionEvent::Failed(reason) => self.handle_failure(reason),
            }
            if self.transport.is_none() {
                break;
            }
        }

        let now = self.lifecycle.now_ms();
        self.replicas.advance(now);
        count
    }

    fn handle_peer_connected(&mut self, peer: PeerId) {
        match self.role {
            Some(Role::Host) => {
                if self.signaling.requires_answer() && !self.authorized.contains(&peer) {
                    tracing::debug!("⏳ HOST: {} connected before its answer was applied", peer);
                    self.pending.insert(peer);
                    return;
                }
                self.admit(peer);
            }
            Some(Role::Guest) => {
                if self.host_peer != Some(peer) {
                    tracing::debug!("Ignoring non-host peer {}", peer);
                    return;
                }
                tracing::info!("🟢 GUEST: Channel to host {} open", peer);
                if let Some(connection) = self.connections.get_mut(&peer) {
                    connection.state = ConnectionState::Open;
                }
            }
            None => {}
        }
    }

    /// Host: register a guest and bring it up to date
    fn admit(&mut self, peer: PeerId) {
        if self.connections.contains_key(&peer) {
            return;
        }

        // open guest links count even if their roster entry is gone
        let occupied = self.roster.len().max(self.connections.len() + 1);
        if occupied >= self.config.capacity {
            tracing::warn!(
                "🚫 HOST: Rejecting {}, room full ({}/{})",
                peer,
                occupied,
                self.config.capacity
            );
            if let Some(transport) = self.transport.as_mut() {
                transport.disconnect(peer);
            }
            return;
        }

        let slot = self.roster.len();
        let guest = match Participant::new_guest(
            peer.participant_id(),
            Participant::default_name(slot),
            self.roster.next_color_index(),
        ) {
            Ok(guest) => guest,
            Err(e) => {
                tracing::warn!("⚠️ HOST: Cannot create participant for {}: {}", peer, e);
                return;
            }
        };
        if let Err(e) = self.roster.insert(guest.clone()) {
            tracing::warn!("🚫 HOST: Rejecting {}: {}", peer, e);
            if let Some(transport) = self.transport.as_mut() {
                transport.disconnect(peer);
            }
            return;
        }

        self.connections.insert(peer, Connection::open(peer));
        tracing::info!(
            "🟢 HOST: {} joined as '{}' (color {})",
            peer,
            guest.display_name(),
            guest.color_index()
        );

        // newcomer gets the whole table, everybody else just the join
        let snapshot = self.envelope(MessagePayload::GameState {
            players: self.roster.snapshot(),
        });
        self.send_envelope_to(peer, &snapshot);

        let joined = self.envelope(MessagePayload::PlayerJoined(guest));
        self.broadcast_envelope(&joined, Some(peer));
        self.deliver_local(&joined);

        if self.state == SessionState::AwaitingGuests {
            self.set_state(SessionState::Active);
        }
    }

    fn handle_peer_disconnected(&mut self, peer: PeerId) {
        self.pending.remove(&peer);

        match self.role {
            Some(Role::Host) => {
                if self.connections.remove(&peer).is_none() {
                    return;
                }
                let id = peer.participant_id();
                tracing::info!("🔴 HOST: {} left", id);

                let left = self.envelope(MessagePayload::PlayerDisconnected { id });
                self.broadcast_envelope(&left, None);
                self.deliver_local(&left);
            }
            Some(Role::Guest) => {
                if self.host_peer != Some(peer) {
                    return;
                }
                if self.state == SessionState::AwaitingHostAck {
                    tracing::warn!("🚫 GUEST: Host hung up before acknowledging, room full");
                    self.handshake_failure = Some(SessionError::RoomFull);
                } else {
                    tracing::warn!("🔴 GUEST: Lost connection to host");
                }
                self.drop_session();
            }
            None => {}
        }
    }

    fn handle_failure(&mut self, reason: String) {
        tracing::error!("❌ Transport failed: {}", reason);
        if matches!(
            self.state,
            SessionState::AwaitingHostAck | SessionState::Initializing
        ) {
            self.handshake_failure = Some(SessionError::PeerError(reason));
        }
        self.drop_session();
    }

    fn handle_message(&mut self, from: PeerId, data: Vec<u8>) {
        let msg = match NetworkMessage::decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("⚠️ Dropping message from {}: {}", from, e);
                return;
            }
        };

        let Some(role) = self.role else {
            return;
        };

        let trusted = match role {
            Role::Host => self.connections.contains_key(&from),
            Role::Guest => self.host_peer == Some(from),
        };
        if !trusted {
            tracing::debug!("Dropping {} from unadmitted peer {}", msg.kind(), from);
            return;
        }

        match router::route(role, &msg, &from.participant_id()) {
            RouteDecision::Drop(reason) => {
                tracing::warn!("🚫 Dropped {} from {}: {}", msg.kind(), from, reason);
            }
            RouteDecision::Deliver { relay } => {
                tracing::trace!("📥 {} from {}", msg.kind(), msg.sender_id());
                if relay {
                    self.relay(&data, msg.kind(), from);
                }
                self.deliver_local(&msg);
            }
        }
    }

    /// Forward original bytes to every admitted guest except the origin
    fn relay(&mut self, data: &[u8], kind: MessageKind, origin: PeerId) {
        let targets: Vec<PeerId> = self
            .connections
            .values()
            .filter(|c| c.is_open() && c.peer != origin)
            .map(|c| c.peer)
            .collect();

        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        for peer in targets {
            if let Err(e) = transport.send_to(peer, data.to_vec(), delivery_for(kind)) {
                tracing::warn!("⚠️ Relay of {} to {} failed: {}", kind, peer, e);
            }
        }
    }

    // ===== Local delivery =====

    fn deliver_local(&mut self, msg: &NetworkMessage) {
        let roster_changed = self.apply_roster(msg);

        if let Some(LifecycleEvent::GameStarted { .. }) = self.lifecycle.apply(msg) {
            self.player_publisher.reset();
            self.enemy_publisher.reset();
        }

        let now = self.lifecycle.now_ms();
        self.replicas.apply(msg, now);

        if roster_changed {
            self.observers.notify_roster(&self.roster);
        }
        self.observers.notify_message(msg);
    }

    fn apply_roster(&mut self, msg: &NetworkMessage) -> bool {
        match msg.payload() {
            MessagePayload::PlayerJoined(participant) => {
                match self.roster.insert(participant.clone()) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("⚠️ Ignoring join of {}: {}", participant.id(), e);
                        false
                    }
                }
            }
            MessagePayload::PlayerDisconnected { id } => {
                self.replicas.remove_owner(id);
                self.roster.remove(id).is_some()
            }
            MessagePayload::PlayerNameChange { id, name } => {
                match self.roster.rename(id, name.clone()) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("⚠️ Ignoring rename of {}: {}", id, e);
                        false
                    }
                }
            }
            MessagePayload::GameState { players } => {
                if self.role != Some(Role::Guest) {
                    return false;
                }
                if let Err(e) = self.roster.replace_all(players.clone()) {
                    tracing::warn!("⚠️ Rejected roster snapshot: {}", e);
                    return false;
                }
                if self.state == SessionState::AwaitingHostAck {
                    self.complete_handshake();
                }
                true
            }
            _ => false,
        }
    }

    /// Guest: the host's roster arrived, the session is live
    fn complete_handshake(&mut self) {
        tracing::info!(
            "🤝 GUEST: Handshake complete ({} participants)",
            self.roster.len()
        );
        if let Some(host) = self.host_peer {
            if let Some(connection) = self.connections.get_mut(&host) {
                connection.state = ConnectionState::Open;
            }
        }
        self.set_state(SessionState::Active);
        self.set_status(ConnectionStatus::Connected);

        if let Some(name) = self.display_name.clone() {
            self.announce_name(name);
        }
    }

    fn announce_name(&mut self, name: String) {
        let Some(id) = self.local_id().cloned() else {
            return;
        };
        if let Err(e) = self.roster.rename(&id, name.clone()) {
            tracing::warn!("⚠️ Cannot rename {}: {}", id, e);
            return;
        }
        if let Err(e) = self.send(MessagePayload::PlayerNameChange { id, name }) {
            tracing::warn!("⚠️ Name announcement failed: {}", e);
        }
    }

    // ===== Sending =====

    fn envelope(&self, payload: MessagePayload) -> NetworkMessage {
        let sender = self
            .local_id
            .clone()
            .unwrap_or_else(|| ParticipantId::new(""));
        NetworkMessage::new(sender, payload, self.lifecycle.clock().raw_ms())
    }

    /// Send a payload to the other participants (host: every guest,
    /// guest: the host). Not delivered locally.
    pub fn send(&mut self, payload: MessagePayload) -> Result<()> {
        if self.transport.is_none() || self.local_peer.is_none() {
            return Err(SessionError::NotConnected);
        }
        let msg = self.envelope(payload);
        self.dispatch(&msg)
    }

    fn dispatch(&mut self, msg: &NetworkMessage) -> Result<()> {
        let data = msg.encode()?;
        let delivery = delivery_for(msg.kind());

        match self.role {
            Some(Role::Host) => {
                self.broadcast_bytes(data, delivery, None);
                Ok(())
            }
            Some(Role::Guest) => {
                let host = self.host_peer.ok_or(SessionError::NotConnected)?;
                let transport = self.transport.as_mut().ok_or(SessionError::NotConnected)?;
                transport.send_to(host, data, delivery)
            }
            None => Err(SessionError::NotConnected),
        }
    }

    fn send_envelope_to(&mut self, peer: PeerId, msg: &NetworkMessage) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let result = msg
            .encode()
            .map_err(SessionError::from)
            .and_then(|data| transport.send_to(peer, data, delivery_for(msg.kind())));
        if let Err(e) = result {
            tracing::warn!("⚠️ Failed to send {} to {}: {}", msg.kind(), peer, e);
        }
    }

    fn broadcast_envelope(&mut self, msg: &NetworkMessage, exclude: Option<PeerId>) {
        match msg.encode() {
            Ok(data) => self.broadcast_bytes(data, delivery_for(msg.kind()), exclude),
            Err(e) => tracing::warn!("⚠️ Failed to encode {}: {}", msg.kind(), e),
        }
    }

    fn broadcast_bytes(&mut self, data: Vec<u8>, delivery: Delivery, exclude: Option<PeerId>) {
        let targets: Vec<PeerId> = self
            .connections
            .values()
            .filter(|c| c.is_open() && Some(c.peer) != exclude)
            .map(|c| c.peer)
            .collect();

        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        for peer in targets {
            if let Err(e) = transport.send_to(peer, data.clone(), delivery) {
                tracing::warn!("⚠️ Send to {} failed: {}", peer, e);
            }
        }
    }

    /// Send and apply locally, so every participant sees the same effect
    fn send_and_deliver(&mut self, payload: MessagePayload) -> Result<()> {
        if self.transport.is_none() || self.local_peer.is_none() {
            return Err(SessionError::NotConnected);
        }
        let msg = self.envelope(payload);
        self.dispatch(&msg)?;
        self.deliver_local(&msg);
        Ok(())
    }

    // ===== Game-facing API =====

    /// Host only: start the match for everyone
    pub fn start_game(&mut self, spawn: Vec2) -> Result<()> {
        if !self.is_host() {
            return Err(SessionError::InvalidState(
                "only the host starts the game".to_string(),
            ));
        }
        tracing::info!("🏁 HOST: Starting game");
        self.send_and_deliver(MessagePayload::GameStart { spawn })
    }

    /// Flip pause for everyone. Returns the new pause state.
    pub fn toggle_pause(&mut self) -> Result<bool> {
        let payload = self.lifecycle.pause_toggle();
        self.send_and_deliver(payload)?;
        Ok(self.lifecycle.is_paused())
    }

    /// Check the match timer; sends `GAME_END` once when it expires.
    /// Returns `true` on the tick that ended the match.
    pub fn tick_lifecycle(&mut self) -> Result<bool> {
        let Some(payload) = self.lifecycle.tick() else {
            return Ok(false);
        };
        let msg = self.envelope(payload);
        if self.transport.is_some() {
            self.dispatch(&msg)?;
        }
        self.deliver_local(&msg);
        Ok(true)
    }

    pub fn set_score(&mut self, score: u32) {
        self.lifecycle.set_local_score(score);
    }

    /// Feed one frame of the local avatar; sends a `PLAYER_UPDATE` when the
    /// player update interval has elapsed. Returns whether one was sent.
    pub fn publish_player(&mut self, elapsed: Duration, state: &PlayerState) -> Result<bool> {
        if self.transport.is_none() {
            return Err(SessionError::NotConnected);
        }
        self.lifecycle.set_local_score(state.score);

        let Some(delta) = self.player_publisher.tick(elapsed, state) else {
            return Ok(false);
        };
        self.send(MessagePayload::PlayerUpdate(delta))?;
        Ok(true)
    }

    /// Host only: feed the simulated enemies; sends `ENEMY_SYNC` when the
    /// enemy sync interval has elapsed.
    pub fn publish_enemies(&mut self, elapsed: Duration, enemies: &[EnemySyncState]) -> Result<bool> {
        if !self.is_host() {
            return Err(SessionError::InvalidState(
                "only the host simulates enemies".to_string(),
            ));
        }

        let Some(snapshot) = self.enemy_publisher.tick(elapsed, enemies) else {
            return Ok(false);
        };
        self.send(MessagePayload::EnemySync(snapshot))?;
        Ok(true)
    }

    /// Change the local display name; announced when connected
    pub fn set_display_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        Participant::validate_name(&name)?;
        self.display_name = Some(name.clone());

        let live = self
            .local_id()
            .map(|id| self.roster.contains(id))
            .unwrap_or(false);
        if live {
            self.announce_name(name);
            self.observers.notify_roster(&self.roster);
        }
        Ok(())
    }

    // ===== Observers =====

    pub fn on_message(&mut self, callback: impl FnMut(&NetworkMessage) + 'static) -> SubscriptionId {
        self.observers.on_message(Box::new(callback))
    }

    /// Invoked immediately with the current status, then on every change
    pub fn on_status_change(
        &mut self,
        mut callback: impl FnMut(ConnectionStatus) + 'static,
    ) -> SubscriptionId {
        callback(self.status);
        self.observers.on_status(Box::new(callback))
    }

    pub fn on_roster_change(&mut self, callback: impl FnMut(&Roster) + 'static) -> SubscriptionId {
        self.observers.on_roster(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ===== Teardown =====

    /// Tear down the session and return to `Idle`. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.state == SessionState::Idle && self.transport.is_none() {
            return;
        }
        tracing::info!("👋 Closing session");

        self.teardown();
        self.handshake_failure = None;
        self.set_state(SessionState::Idle);
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Connection lost: keep the failure, move to `Closed`
    fn drop_session(&mut self) {
        self.teardown();
        self.set_state(SessionState::Closed);
        self.set_status(ConnectionStatus::Error);
    }

    fn abort_establishment(&mut self) {
        self.teardown();
        self.set_state(SessionState::Idle);
        self.set_status(ConnectionStatus::Error);
    }

    fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }

        self.connections.clear();
        self.pending.clear();
        self.authorized.clear();
        self.role = None;
        self.host_peer = None;
        self.local_peer = None;
        self.local_id = None;
        self.invite = None;
        self.answer = None;

        self.replicas.clear();
        self.replicas.set_local_id(None);
        self.lifecycle.reset();
        self.lifecycle.set_local_id(None);
        self.player_publisher.reset();
        self.enemy_publisher.reset();

        if !self.roster.is_empty() {
            self.roster.clear();
            self.observers.notify_roster(&self.roster);
        }
    }

    fn ensure_idle(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Closed => {
                self.handshake_failure = None;
                self.set_state(SessionState::Idle);
                Ok(())
            }
            state => Err(SessionError::InvalidState(format!(
                "session already {state:?}"
            ))),
        }
    }

    fn set_local(&mut self, peer: PeerId) {
        let id = peer.participant_id();
        self.local_peer = Some(peer);
        self.local_id = Some(id.clone());
        self.replicas.set_local_id(Some(id.clone()));
        self.lifecycle.set_local_id(Some(id));
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            tracing::debug!("🔁 Session {:?} → {:?}", self.state, state);
            self.state = state;
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            tracing::info!("📶 Connection status: {}", status);
            self.status = status;
            self.observers.notify_status(status);
        }
    }

    // ===== Accessors =====

    pub fn is_host(&self) -> bool {
        self.role == Some(Role::Host)
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn local_peer(&self) -> Option<PeerId> {
        self.local_peer
    }

    pub fn local_id(&self) -> Option<&ParticipantId> {
        self.local_id.as_ref()
    }

    pub fn host_peer(&self) -> Option<PeerId> {
        self.host_peer
    }

    /// Invite or offer blob of a hosted session
    pub fn invite(&self) -> Option<&str> {
        self.invite.as_deref()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn pending_peers(&self) -> usize {
        self.pending.len()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn replicas(&self) -> &ReplicaStore {
        &self.replicas
    }

    pub fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    /// Game time in milliseconds (frozen while paused)
    pub fn now_ms(&self) -> u64 {
        self.lifecycle.now_ms()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl<S: SignalingExchange> Drop for SessionManager<S> {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }
}
