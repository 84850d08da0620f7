use crate::domain::{DetachedLimb, MessagePayload, NetworkMessage, ParticipantId};
use crate::replication::enemy::{EnemyReplica, EnemyReplicaSet};
use crate::replication::geometry::Vec2;
use crate::replication::player::{LimbState, PlayerState};
use std::collections::HashMap;

/// Shadow copies of every remotely owned entity
#[derive(Debug, Clone)]
pub struct ReplicaStore {
    local_id: Option<ParticipantId>,
    players: HashMap<ParticipantId, PlayerState>,
    enemies: EnemyReplicaSet,
    /// Limbs knocked off remote players, keyed by the player they came from
    debris: Vec<(ParticipantId, DetachedLimb)>,
}

impl ReplicaStore {
    pub fn new(interpolation_window_ms: u64) -> Self {
        Self {
            local_id: None,
            players: HashMap::new(),
            enemies: EnemyReplicaSet::new(interpolation_window_ms),
            debris: Vec::new(),
        }
    }

    /// Updates about this id are never replicated locally
    pub fn set_local_id(&mut self, id: Option<ParticipantId>) {
        self.local_id = id;
    }

    /// Apply a delivered message at game time `now`.
    ///
    /// Returns `true` when replicated state changed.
    pub fn apply(&mut self, msg: &NetworkMessage, now: u64) -> bool {
        match msg.payload() {
            MessagePayload::PlayerUpdate(delta) => {
                if self.local_id.as_ref() == Some(msg.sender_id()) {
                    return false;
                }
                match self.players.get_mut(msg.sender_id()) {
                    Some(replica) => replica.apply_delta(delta),
                    None => {
                        tracing::debug!("🤖 First sighting of player {}", msg.sender_id());
                        self.players
                            .insert(msg.sender_id().clone(), PlayerState::from_delta(delta));
                    }
                }
                true
            }
            MessagePayload::EnemySync(snapshot) => {
                self.enemies.apply_snapshot(snapshot, now);
                true
            }
            MessagePayload::PlayerDied { id, .. } | MessagePayload::PlayerDisconnected { id } => {
                self.remove_owner(id)
            }
            MessagePayload::EnemyDied { id } => self.enemies.remove(id).is_some(),
            MessagePayload::LimbLost { id, limb } => match self.players.get_mut(id) {
                Some(replica) => {
                    replica.limbs.insert(
                        *limb,
                        LimbState {
                            hp: 0.0,
                            exists: false,
                        },
                    );
                    true
                }
                None => false,
            },
            MessagePayload::LimbAttached { limb } => match self.players.get_mut(msg.sender_id()) {
                Some(replica) => {
                    replica.limbs.insert(*limb, LimbState::full(*limb));
                    true
                }
                None => false,
            },
            MessagePayload::LimbDetached(limb) => {
                if self.local_id.as_ref() == Some(msg.sender_id()) {
                    return false;
                }
                self.debris.push((msg.sender_id().clone(), limb.clone()));
                true
            }
            MessagePayload::StarCollected {} => {
                // collecting the star sweeps the collector's debris
                let before = self.debris.len();
                self.debris.retain(|(owner, _)| owner != msg.sender_id());
                self.debris.len() != before
            }
            _ => false,
        }
    }

    /// Drop everything owned by `id`
    pub fn remove_owner(&mut self, id: &ParticipantId) -> bool {
        self.debris.retain(|(owner, _)| owner != id);
        self.players.remove(id).is_some()
    }

    /// Settle finished interpolations
    pub fn advance(&mut self, now: u64) {
        self.enemies.advance(now);
    }

    pub fn player(&self, id: &ParticipantId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = (&ParticipantId, &PlayerState)> {
        self.players.iter()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyReplica> {
        self.enemies.get(id)
    }

    pub fn enemy_position(&self, id: &str, now: u64) -> Option<Vec2> {
        self.enemies.rendered_position(id, now)
    }

    pub fn enemies(&self) -> &EnemyReplicaSet {
        &self.enemies
    }

    pub fn debris(&self) -> impl Iterator<Item = (&ParticipantId, &DetachedLimb)> {
        self.debris.iter().map(|(owner, limb)| (owner, limb))
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.enemies.clear();
        self.debris.clear();
    }
}
