//! State replication: delta-encoded player streams, throttled enemy
//! snapshots and receiver-side interpolation.

mod clock;
mod config;
mod enemy;
mod geometry;
mod player;
mod publisher;
mod store;
mod throttle;

pub use clock::{ManualTimeSource, PausableClock, SystemTimeSource, TimeSource};
pub use config::{
    ReplicationConfig, ENEMY_SYNC_INTERVAL, GAME_DURATION, INTERPOLATION_WINDOW,
    PLAYER_UPDATE_INTERVAL,
};
pub use enemy::{EnemyReplica, EnemyReplicaSet, EnemySnapshot, EnemySyncState, Interpolation};
pub use geometry::Vec2;
pub use player::{DeltaBaseline, LimbDelta, LimbState, LimbType, PlayerDelta, PlayerState};
pub use publisher::{EnemyPublisher, PlayerPublisher};
pub use store::ReplicaStore;
pub use throttle::Throttle;
