//! Out-of-band connection bootstrapping.
//!
//! Two participants swap opaque blobs (offer, then answer) to end up with
//! transports that can reach each other. Replication never sees this layer.

mod manual;
mod room_code;

pub use manual::{ManualSignaling, SIGNALING_VERSION};
pub use room_code::RoomCodeSignaling;

use crate::domain::PeerId;
use crate::error::Result;
use crate::infrastructure::NetworkConnection;
use async_trait::async_trait;

/// Host side of a created offer
pub struct HostOffer<C> {
    /// Blob the host shares with guests
    pub blob: String,
    pub connection: C,
}

/// Guest side of a created answer
pub struct GuestAnswer<C> {
    /// Blob the guest hands back to the host (may be empty)
    pub blob: String,
    /// Peer the guest must connect to
    pub host: PeerId,
    pub connection: C,
}

#[async_trait(?Send)]
pub trait SignalingExchange {
    type Connection: NetworkConnection;

    /// Allocate the host's transport and describe how to reach it
    async fn create_offer(&mut self) -> Result<HostOffer<Self::Connection>>;

    /// Parse an offer and open a transport towards its host
    async fn create_answer(&mut self, offer: &str) -> Result<GuestAnswer<Self::Connection>>;

    /// Complete the host side for one guest.
    ///
    /// Returns the guest that is now allowed in, or `None` when this
    /// exchange does not gate admission.
    fn apply_answer(&mut self, answer: &str) -> Result<Option<PeerId>>;

    /// Whether inbound peers must be vouched for by an applied answer
    fn requires_answer(&self) -> bool;
}
