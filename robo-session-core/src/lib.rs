//! Transport-agnostic session domain for Robo Arena multiplayer.
//!
//! Holds everything a peer needs that does not touch the network:
//! participants and the roster, the wire message envelope, the state
//! replication protocol and the match lifecycle.

pub mod application;
pub mod domain;
pub mod replication;

pub use application::{GameTimer, LifecycleCoordinator, LifecycleEvent, Scoreboard};
pub use domain::{
    DamageEvent, DetachedLimb, MessageCategory, MessageError, MessageKind, MessagePayload,
    NetworkMessage, Participant, ParticipantError, ParticipantId, Role, Roster, RosterError,
    ShotEvent, Weapon, CAPACITY, PALETTE_LEN,
};
pub use replication::{
    EnemyPublisher, EnemySnapshot, EnemySyncState, LimbType, ManualTimeSource, PausableClock,
    PlayerDelta, PlayerPublisher, PlayerState, ReplicaStore, ReplicationConfig,
    SystemTimeSource, TimeSource, Vec2,
};
