use crate::replication::geometry::Vec2;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimal per-enemy state the host publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnemySyncState {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub hp: f32,
}

impl EnemySyncState {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// `ENEMY_SYNC` payload: every live enemy the host simulates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct EnemySnapshot {
    pub enemies: Vec<EnemySyncState>,
}

impl EnemySnapshot {
    pub fn new(enemies: Vec<EnemySyncState>) -> Self {
        Self { enemies }
    }
}

/// Movement from the last rendered position towards a snapshot position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    pub start: Vec2,
    pub target: Vec2,
    pub start_time: u64,
}

impl Interpolation {
    /// Fraction of the window elapsed at `now`, in `[0, 1]`
    pub fn progress(&self, now: u64, window_ms: u64) -> f32 {
        if window_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_time);
        (elapsed as f32 / window_ms as f32).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now: u64, window_ms: u64) -> Vec2 {
        let t = self.progress(now, window_ms);
        if t >= 1.0 {
            return self.target;
        }
        self.start.lerp(self.target, t)
    }
}

/// Receiver-side shadow of one host-simulated enemy
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyReplica {
    pub id: String,
    pub hp: f32,
    /// Latest authoritative position (resting point once interpolation ends)
    pub target: Vec2,
    pub interpolation: Option<Interpolation>,
}

impl EnemyReplica {
    fn spawn(state: &EnemySyncState) -> Self {
        Self {
            id: state.id.clone(),
            hp: state.hp,
            target: state.position(),
            interpolation: None,
        }
    }

    /// Position to draw at `now`
    pub fn rendered_position(&self, now: u64, window_ms: u64) -> Vec2 {
        match &self.interpolation {
            Some(interp) => interp.sample(now, window_ms),
            None => self.target,
        }
    }

    pub fn is_interpolating(&self) -> bool {
        self.interpolation.is_some()
    }
}

/// Set of enemy replicas driven by host snapshots
#[derive(Debug, Clone)]
pub struct EnemyReplicaSet {
    enemies: HashMap<String, EnemyReplica>,
    window_ms: u64,
}

impl EnemyReplicaSet {
    pub fn new(window_ms: u64) -> Self {
        Self {
            enemies: HashMap::new(),
            window_ms,
        }
    }

    /// Apply a host snapshot received at game time `now`.
    ///
    /// Unknown ids appear at their snapshot position, known ids glide from
    /// where they are currently drawn, ids missing from the snapshot vanish.
    pub fn apply_snapshot(&mut self, snapshot: &EnemySnapshot, now: u64) {
        let window = self.window_ms;

        let before = self.enemies.len();
        self.enemies
            .retain(|id, _| snapshot.enemies.iter().any(|e| &e.id == id));
        let removed = before - self.enemies.len();
        if removed > 0 {
            tracing::debug!("💀 Removed {} enemies absent from snapshot", removed);
        }

        for state in &snapshot.enemies {
            let target = state.position();

            match self.enemies.get_mut(&state.id) {
                None => {
                    self.enemies
                        .insert(state.id.clone(), EnemyReplica::spawn(state));
                }
                Some(replica) => {
                    replica.hp = state.hp;

                    if replica.target == target {
                        continue;
                    }

                    let start = replica.rendered_position(now, window);
                    replica.target = target;
                    replica.interpolation = Some(Interpolation {
                        start,
                        target,
                        start_time: now,
                    });
                }
            }
        }
    }

    /// Drop interpolations whose window has elapsed
    pub fn advance(&mut self, now: u64) {
        let window = self.window_ms;
        for replica in self.enemies.values_mut() {
            let finished = replica
                .interpolation
                .map(|i| now.saturating_sub(i.start_time) >= window)
                .unwrap_or(false);
            if finished {
                replica.interpolation = None;
            }
        }
    }

    pub fn rendered_position(&self, id: &str, now: u64) -> Option<Vec2> {
        self.enemies
            .get(id)
            .map(|replica| replica.rendered_position(now, self.window_ms))
    }

    pub fn get(&self, id: &str) -> Option<&EnemyReplica> {
        self.enemies.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyReplica> {
        self.enemies.values()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Forget an enemy ahead of the next snapshot
    pub fn remove(&mut self, id: &str) -> Option<EnemyReplica> {
        self.enemies.remove(id)
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 450;

    fn enemy(id: &str, x: f32, y: f32) -> EnemySyncState {
        EnemySyncState {
            id: id.to_string(),
            x,
            y,
            hp: 30.0,
        }
    }

    fn snapshot(enemies: Vec<EnemySyncState>) -> EnemySnapshot {
        EnemySnapshot::new(enemies)
    }

    #[test]
    fn test_first_sighting_has_no_interpolation() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 10.0, 20.0)]), 0);

        let replica = set.get("e1").unwrap();
        assert!(!replica.is_interpolating());
        assert_eq!(set.rendered_position("e1", 0), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_interpolation_bounds() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 0.0, 0.0)]), 0);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 90.0, 0.0)]), 1_000);

        assert_eq!(set.rendered_position("e1", 1_000), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(
            set.rendered_position("e1", 1_225),
            Some(Vec2::new(45.0, 0.0))
        );
        assert_eq!(
            set.rendered_position("e1", 1_450),
            Some(Vec2::new(90.0, 0.0))
        );
        assert_eq!(
            set.rendered_position("e1", 5_000),
            Some(Vec2::new(90.0, 0.0))
        );

        set.advance(1_450);
        assert!(!set.get("e1").unwrap().is_interpolating());
        assert_eq!(
            set.rendered_position("e1", 1_450),
            Some(Vec2::new(90.0, 0.0))
        );
    }

    #[test]
    fn test_glide_ends_exactly_on_fractional_target() {
        let glides = [
            ((1234.567, 40.5), (100.123, 12.34)),
            ((512.25, -3.3), (17.77, 0.1)),
            ((100000.0, 0.7), (0.1, 999.99)),
        ];

        for (from, to) in glides {
            let mut set = EnemyReplicaSet::new(WINDOW);
            set.apply_snapshot(&snapshot(vec![enemy("e", from.0, from.1)]), 0);
            set.apply_snapshot(&snapshot(vec![enemy("e", to.0, to.1)]), 2_000);

            let target = Vec2::new(to.0, to.1);
            assert_eq!(set.rendered_position("e", 2_000 + WINDOW), Some(target));
            assert_eq!(set.rendered_position("e", 9_999), Some(target));
        }
    }

    #[test]
    fn test_remove_forgets_enemy() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 0.0, 0.0)]), 0);

        assert!(set.remove("e1").is_some());
        assert!(set.remove("e1").is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_duplicate_snapshot_is_idempotent() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 0.0, 0.0)]), 0);

        let moved = snapshot(vec![enemy("e1", 100.0, 0.0)]);
        set.apply_snapshot(&moved, 500);
        let once = set.get("e1").cloned();

        set.apply_snapshot(&moved, 700);
        assert_eq!(set.get("e1").cloned(), once);
    }

    #[test]
    fn test_retarget_starts_from_rendered_position() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 0.0, 0.0)]), 0);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 90.0, 0.0)]), 0);

        // halfway through the first glide a new target arrives
        set.apply_snapshot(&snapshot(vec![enemy("e1", 90.0, 90.0)]), 225);

        let interp = set.get("e1").unwrap().interpolation.unwrap();
        assert_eq!(interp.start, Vec2::new(45.0, 0.0));
        assert_eq!(interp.target, Vec2::new(90.0, 90.0));
        assert_eq!(interp.start_time, 225);
    }

    #[test]
    fn test_absent_ids_removed() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(
            &snapshot(vec![enemy("e1", 0.0, 0.0), enemy("e2", 5.0, 5.0)]),
            0,
        );
        set.apply_snapshot(&snapshot(vec![enemy("e2", 6.0, 5.0)]), 500);

        assert_eq!(set.len(), 1);
        assert!(set.get("e1").is_none());
        assert!(set.rendered_position("e1", 500).is_none());
    }

    #[test]
    fn test_hp_updates_without_movement() {
        let mut set = EnemyReplicaSet::new(WINDOW);
        set.apply_snapshot(&snapshot(vec![enemy("e1", 0.0, 0.0)]), 0);

        let mut hurt = enemy("e1", 0.0, 0.0);
        hurt.hp = 5.0;
        set.apply_snapshot(&snapshot(vec![hurt]), 500);

        let replica = set.get("e1").unwrap();
        assert_eq!(replica.hp, 5.0);
        assert!(!replica.is_interpolating());
    }
}
