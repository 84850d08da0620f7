//! Peer-to-peer session layer for Robo Arena.
//!
//! A host and up to three guests form a star over WebRTC data channels
//! (via matchbox). The host relays guest traffic, owns the roster and
//! simulates enemies; everybody replicates their own avatar.

// Domain layer (core)
pub mod domain;

// Application layer (use cases)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

// Connection bootstrapping
pub mod signaling;

pub mod error;

// Re-exports for convenience
pub use application::{
    ConnectionStatus, ManualSessionManager, MatchboxSessionManager, MemorySessionManager,
    SessionConfig, SessionManager, SessionState, SubscriptionId,
};
pub use domain::{IceServer, InviteToken, PeerId, RoomId};
pub use error::{Result, SessionError};
pub use infrastructure::{ConnectionEvent, Delivery, MemoryNetwork, NetworkConnection};
pub use signaling::{ManualSignaling, RoomCodeSignaling, SignalingExchange};
