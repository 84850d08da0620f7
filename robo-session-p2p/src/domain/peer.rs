use robo_session_core::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// Re-export the underlying matchbox type
pub use matchbox_socket::PeerId as MatchboxPeerId;

/// Transport-level identity of a connected peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub MatchboxPeerId);

impl PeerId {
    pub fn new(id: MatchboxPeerId) -> Self {
        Self(id)
    }

    /// Fresh random id (in-memory transport)
    pub fn random() -> Self {
        Self(MatchboxPeerId(Uuid::new_v4()))
    }

    pub fn inner(&self) -> MatchboxPeerId {
        self.0
    }

    /// Session-layer identity of this peer
    pub fn participant_id(&self) -> ParticipantId {
        ParticipantId::new(self.to_string())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MatchboxPeerId> for PeerId {
    fn from(id: MatchboxPeerId) -> Self {
        Self(id)
    }
}

impl FromStr for PeerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(|uuid| Self(MatchboxPeerId(uuid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_matches_display() {
        let peer = PeerId::random();
        assert_eq!(peer.participant_id().as_str(), peer.to_string());
    }

    #[test]
    fn test_parse_round_trips_display() {
        let peer = PeerId::random();
        let parsed: PeerId = peer.to_string().parse().unwrap();
        assert_eq!(parsed, peer);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-peer".parse::<PeerId>().is_err());
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(PeerId::random(), PeerId::random());
    }
}
