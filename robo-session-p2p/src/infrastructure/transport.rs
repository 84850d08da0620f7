use crate::domain::PeerId;
use crate::error::Result;

/// Events emitted by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// A data channel to this peer is open
    PeerConnected(PeerId),
    /// The channel to this peer closed
    PeerDisconnected(PeerId),
    /// Received a message from a peer
    MessageReceived { from: PeerId, data: Vec<u8> },
    /// The transport itself failed; no further events will follow
    Failed(String),
}

/// Delivery class requested for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Retransmitted until acknowledged (roster and lifecycle traffic)
    Reliable,
    /// Fire-and-forget (high-rate replication)
    Unreliable,
}

/// Message-oriented peer transport (allows mocking in tests).
///
/// No ordering or delivery guarantees beyond what [`Delivery`] requests.
pub trait NetworkConnection {
    fn local_peer_id(&self) -> Option<PeerId>;

    fn connected_peers(&self) -> Vec<PeerId>;

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>, delivery: Delivery) -> Result<()>;

    fn broadcast(&mut self, data: Vec<u8>, delivery: Delivery) -> Result<()> {
        for peer in self.connected_peers() {
            self.send_to(peer, data.clone(), delivery)?;
        }
        Ok(())
    }

    /// Drain pending events (call this regularly in your event loop)
    fn poll_events(&mut self) -> Vec<ConnectionEvent>;

    /// Stop talking to one peer
    fn disconnect(&mut self, peer: PeerId);

    /// Tear down every channel; later sends fail and late events are dropped
    fn close(&mut self);
}
