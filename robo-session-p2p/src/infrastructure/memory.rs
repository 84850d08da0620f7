use crate::domain::PeerId;
use crate::error::{Result, SessionError};
use crate::infrastructure::transport::{ConnectionEvent, Delivery, NetworkConnection};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-process stand-in for a signalling server plus data channels.
///
/// Every room is a full mesh: joining peers see `PeerConnected` for each
/// member and vice versa. Delivery is immediate and in order. Cloning
/// shares the same network.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Mutex<NetworkState>>,
}

#[derive(Default)]
struct NetworkState {
    rooms: HashMap<String, Vec<PeerId>>,
    inboxes: HashMap<PeerId, VecDeque<ConnectionEvent>>,
    /// Unordered pairs whose channel was hung up
    severed: HashSet<(PeerId, PeerId)>,
}

impl NetworkState {
    fn link_key(a: PeerId, b: PeerId) -> (PeerId, PeerId) {
        if a.to_string() <= b.to_string() {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn is_linked(&self, a: PeerId, b: PeerId) -> bool {
        a != b
            && self.inboxes.contains_key(&a)
            && self.inboxes.contains_key(&b)
            && !self.severed.contains(&Self::link_key(a, b))
            && self
                .rooms
                .values()
                .any(|members| members.contains(&a) && members.contains(&b))
    }

    fn push(&mut self, to: PeerId, event: ConnectionEvent) {
        if let Some(inbox) = self.inboxes.get_mut(&to) {
            inbox.push_back(event);
        }
    }

    fn peers_of(&self, id: PeerId) -> Vec<PeerId> {
        self.rooms
            .values()
            .filter(|members| members.contains(&id))
            .flat_map(|members| members.iter().copied())
            .filter(|&peer| self.is_linked(id, peer))
            .collect()
    }
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, NetworkState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join `room` as a fresh peer
    pub fn join(&self, room: &str) -> MemoryConnection {
        let id = PeerId::random();
        let mut state = self.state();

        state.inboxes.insert(id, VecDeque::new());
        let members = state.rooms.entry(room.to_string()).or_default();
        let existing: Vec<PeerId> = members.clone();
        members.push(id);

        for peer in existing {
            state.push(peer, ConnectionEvent::PeerConnected(id));
            state.push(id, ConnectionEvent::PeerConnected(peer));
        }

        tracing::trace!("🌐 Memory peer {} joined room {}", id, room);

        MemoryConnection {
            id,
            network: self.clone(),
            closed: false,
        }
    }

    /// Simulate a fatal transport failure on `peer`
    pub fn fail(&self, peer: PeerId, reason: &str) {
        self.state()
            .push(peer, ConnectionEvent::Failed(reason.to_string()));
    }

    /// Number of live peers in `room`
    pub fn room_size(&self, room: &str) -> usize {
        self.state().rooms.get(room).map(Vec::len).unwrap_or(0)
    }
}

/// One peer's handle on a [`MemoryNetwork`]
pub struct MemoryConnection {
    id: PeerId,
    network: MemoryNetwork,
    closed: bool,
}

impl NetworkConnection for MemoryConnection {
    fn local_peer_id(&self) -> Option<PeerId> {
        Some(self.id)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        if self.closed {
            return Vec::new();
        }
        self.network.state().peers_of(self.id)
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>, _delivery: Delivery) -> Result<()> {
        if self.closed {
            return Err(SessionError::NotConnected);
        }

        let mut state = self.network.state();
        if !state.is_linked(self.id, peer) {
            return Err(SessionError::Transport(format!("peer {peer} not reachable")));
        }

        tracing::trace!("📤 {} → {} ({} bytes)", self.id, peer, data.len());
        state.push(
            peer,
            ConnectionEvent::MessageReceived {
                from: self.id,
                data,
            },
        );
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<ConnectionEvent> {
        if self.closed {
            return Vec::new();
        }
        self.network
            .state()
            .inboxes
            .get_mut(&self.id)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    fn disconnect(&mut self, peer: PeerId) {
        let mut state = self.network.state();
        if !state.is_linked(self.id, peer) {
            return;
        }
        state.severed.insert(NetworkState::link_key(self.id, peer));
        state.push(peer, ConnectionEvent::PeerDisconnected(self.id));
        tracing::trace!("✂️ {} hung up on {}", self.id, peer);
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut state = self.network.state();
        for peer in state.peers_of(self.id) {
            state.push(peer, ConnectionEvent::PeerDisconnected(self.id));
        }
        state.inboxes.remove(&self.id);
        for members in state.rooms.values_mut() {
            members.retain(|&p| p != self.id);
        }
        state.rooms.retain(|_, members| !members.is_empty());
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_announces_both_ways() {
        let network = MemoryNetwork::new();
        let mut a = network.join("room");
        let mut b = network.join("room");

        let b_id = b.local_peer_id().unwrap();
        let a_id = a.local_peer_id().unwrap();

        assert_eq!(a.poll_events(), vec![ConnectionEvent::PeerConnected(b_id)]);
        assert_eq!(b.poll_events(), vec![ConnectionEvent::PeerConnected(a_id)]);
    }

    #[test]
    fn test_rooms_are_isolated() {
        let network = MemoryNetwork::new();
        let mut a = network.join("one");
        let b = network.join("two");

        assert!(a.poll_events().is_empty());
        assert!(a.connected_peers().is_empty());
        assert!(a
            .send_to(b.local_peer_id().unwrap(), vec![1], Delivery::Reliable)
            .is_err());
    }

    #[test]
    fn test_send_and_receive() {
        let network = MemoryNetwork::new();
        let mut a = network.join("room");
        let mut b = network.join("room");
        b.poll_events();

        let b_id = b.local_peer_id().unwrap();
        a.send_to(b_id, b"hello".to_vec(), Delivery::Unreliable)
            .unwrap();

        assert_eq!(
            b.poll_events(),
            vec![ConnectionEvent::MessageReceived {
                from: a.local_peer_id().unwrap(),
                data: b"hello".to_vec()
            }]
        );
    }

    #[test]
    fn test_disconnect_notifies_remote_only() {
        let network = MemoryNetwork::new();
        let mut a = network.join("room");
        let mut b = network.join("room");
        a.poll_events();
        b.poll_events();

        let a_id = a.local_peer_id().unwrap();
        let b_id = b.local_peer_id().unwrap();
        a.disconnect(b_id);

        assert!(a.poll_events().is_empty());
        assert_eq!(b.poll_events(), vec![ConnectionEvent::PeerDisconnected(a_id)]);
        assert!(b.send_to(a_id, vec![0], Delivery::Reliable).is_err());
        assert!(a.connected_peers().is_empty());
    }

    #[test]
    fn test_close_leaves_room() {
        let network = MemoryNetwork::new();
        let mut a = network.join("room");
        let mut b = network.join("room");
        b.poll_events();
        let a_id = a.local_peer_id().unwrap();

        a.close();

        assert_eq!(network.room_size("room"), 1);
        assert_eq!(b.poll_events(), vec![ConnectionEvent::PeerDisconnected(a_id)]);
        assert!(a.send_to(a_id, vec![], Delivery::Reliable).is_err());
    }

    #[test]
    fn test_drop_closes() {
        let network = MemoryNetwork::new();
        let mut a = network.join("room");
        {
            let _b = network.join("room");
        }

        let events = a.poll_events();
        assert!(matches!(events[0], ConnectionEvent::PeerConnected(_)));
        assert!(matches!(events[1], ConnectionEvent::PeerDisconnected(_)));
        assert_eq!(network.room_size("room"), 1);
    }

    #[test]
    fn test_fail_injects_event() {
        let network = MemoryNetwork::new();
        let mut a = network.join("room");

        network.fail(a.local_peer_id().unwrap(), "ice failed");

        assert_eq!(
            a.poll_events(),
            vec![ConnectionEvent::Failed("ice failed".to_string())]
        );
    }
}
