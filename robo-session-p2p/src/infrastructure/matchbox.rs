use crate::domain::{IceServer, PeerId};
use crate::error::{Result, SessionError};
use crate::infrastructure::platform::{platform_sleep, spawn_detached};
use crate::infrastructure::transport::{ConnectionEvent, Delivery, NetworkConnection};
use matchbox_socket::{
    ChannelConfig, MessageLoopFuture, MultipleChannels, RtcIceServerConfig, WebRtcSocket,
    WebRtcSocketBuilder,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Instrument;

const RELIABLE_CHANNEL: usize = 0;
const UNRELIABLE_CHANNEL: usize = 1;

/// WebRTC transport through a matchbox signalling room
pub struct MatchboxConnection {
    socket: Option<WebRtcSocket<MultipleChannels>>,
    local_peer_id: PeerId,
    blocked: HashSet<PeerId>,
    failure: Arc<Mutex<Option<String>>>,
    failure_reported: bool,
}

impl MatchboxConnection {
    /// Join the signalling room at `room_url` (`wss://host/room`)
    pub async fn connect(room_url: &str, ice_servers: &[IceServer]) -> Result<Self> {
        tracing::info!("🔌 Connecting to signalling room: {}", room_url);
        for (i, server) in ice_servers.iter().enumerate() {
            tracing::debug!(
                "  ICE Server {}: {}{}",
                i + 1,
                server.urls.join(", "),
                if server.username.is_some() { " (with auth)" } else { "" }
            );
        }

        let (mut socket, loop_fut) = open_socket(room_url, ice_servers);

        let failure = Arc::new(Mutex::new(None));
        let failure_slot = failure.clone();
        let span = tracing::info_span!("matchbox::webrtc_loop", room = %room_url);

        spawn_detached(
            async move {
                if let Err(e) = loop_fut.await {
                    tracing::warn!("❌ Matchbox message loop ended: {}", e);
                    *failure_slot.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(e.to_string());
                }
            }
            .instrument(span),
        );

        let local_peer_id = wait_for_peer_id(&mut socket).await?;
        tracing::info!("✅ Connected with peer ID: {}", local_peer_id);

        Ok(MatchboxConnection {
            socket: Some(socket),
            local_peer_id,
            blocked: HashSet::new(),
            failure,
            failure_reported: false,
        })
    }

    fn take_failure(&mut self) -> Option<String> {
        if self.failure_reported {
            return None;
        }
        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if failure.is_some() {
            self.failure_reported = true;
        }
        failure
    }
}

impl NetworkConnection for MatchboxConnection {
    fn local_peer_id(&self) -> Option<PeerId> {
        Some(self.local_peer_id)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        match &self.socket {
            Some(socket) => socket
                .connected_peers()
                .map(PeerId::new)
                .filter(|peer| !self.blocked.contains(peer))
                .collect(),
            None => Vec::new(),
        }
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>, delivery: Delivery) -> Result<()> {
        if self.blocked.contains(&peer) {
            return Err(SessionError::Transport(format!("peer {peer} is disconnected")));
        }
        let socket = self.socket.as_mut().ok_or(SessionError::NotConnected)?;

        let channel = match delivery {
            Delivery::Reliable => RELIABLE_CHANNEL,
            Delivery::Unreliable => UNRELIABLE_CHANNEL,
        };
        let len = data.len();
        socket
            .channel_mut(channel)
            .send(data.into_boxed_slice(), peer.inner());

        tracing::trace!("📤 Sent {} bytes to peer {} ({:?})", len, peer, delivery);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();

        if let Some(reason) = self.take_failure() {
            events.push(ConnectionEvent::Failed(reason));
            return events;
        }

        let Some(socket) = self.socket.as_mut() else {
            return events;
        };

        for (peer_id, state) in socket.update_peers() {
            let peer = PeerId::new(peer_id);
            if self.blocked.contains(&peer) {
                continue;
            }
            match state {
                matchbox_socket::PeerState::Connected => {
                    tracing::debug!("🟢 Peer connected: {}", peer);
                    events.push(ConnectionEvent::PeerConnected(peer));
                }
                matchbox_socket::PeerState::Disconnected => {
                    tracing::debug!("🔴 Peer disconnected: {}", peer);
                    events.push(ConnectionEvent::PeerDisconnected(peer));
                }
            }
        }

        for channel in [RELIABLE_CHANNEL, UNRELIABLE_CHANNEL] {
            for (peer_id, packet) in socket.channel_mut(channel).receive() {
                let peer = PeerId::new(peer_id);
                if self.blocked.contains(&peer) {
                    continue;
                }
                tracing::trace!("📥 Received {} bytes from peer {}", packet.len(), peer);
                events.push(ConnectionEvent::MessageReceived {
                    from: peer,
                    data: packet.into_vec(),
                });
            }
        }

        events
    }

    fn disconnect(&mut self, peer: PeerId) {
        // matchbox has no per-peer hang-up; the peer is muted instead
        if self.blocked.insert(peer) {
            tracing::debug!("🔇 Muted peer {}", peer);
        }
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::info!("🔌 Closed matchbox socket");
        }
    }
}

/// Socket with the reliable and unreliable channels; idle until the loop
/// future is driven
fn open_socket(
    room_url: &str,
    ice_servers: &[IceServer],
) -> (WebRtcSocket<MultipleChannels>, MessageLoopFuture) {
    WebRtcSocketBuilder::new(room_url)
        .ice_server(build_ice_server_config(ice_servers))
        .add_channel(ChannelConfig::reliable())
        .add_channel(ChannelConfig::unreliable())
        .build()
}

/// Build ICE server configuration for Matchbox
fn build_ice_server_config(ice_servers: &[IceServer]) -> RtcIceServerConfig {
    // Matchbox only supports one ICE server config; prefer a TURN relay
    let Some(server) = ice_servers
        .iter()
        .find(|s| s.is_turn())
        .or_else(|| ice_servers.first())
    else {
        return RtcIceServerConfig::default();
    };

    RtcIceServerConfig {
        urls: server.urls.clone(),
        username: server.username.clone(),
        credential: server.credential.clone(),
    }
}

/// Wait for the signalling server to assign our peer id
async fn wait_for_peer_id(socket: &mut WebRtcSocket<MultipleChannels>) -> Result<PeerId> {
    use instant::Duration;

    let start = instant::Instant::now();
    let timeout = Duration::from_secs(5);

    loop {
        socket.update_peers();

        if let Some(id) = socket.id() {
            return Ok(PeerId::new(id));
        }

        if start.elapsed() > timeout {
            return Err(SessionError::Signaling(
                "timeout waiting for peer ID".to_string(),
            ));
        }

        platform_sleep(Duration::from_millis(10)).await;
    }
}
