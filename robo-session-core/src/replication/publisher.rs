use crate::replication::enemy::{EnemySnapshot, EnemySyncState};
use crate::replication::player::{DeltaBaseline, PlayerDelta, PlayerState};
use crate::replication::throttle::Throttle;
use instant::Duration;

/// Outbound stream of the local avatar: throttle plus delta baseline
#[derive(Debug, Clone)]
pub struct PlayerPublisher {
    baseline: DeltaBaseline,
    throttle: Throttle,
}

impl PlayerPublisher {
    pub fn new(interval: Duration) -> Self {
        Self {
            baseline: DeltaBaseline::new(),
            throttle: Throttle::new(interval),
        }
    }

    /// Produce a delta if the throttle allows one this frame
    pub fn tick(&mut self, elapsed: Duration, state: &PlayerState) -> Option<PlayerDelta> {
        if !self.throttle.ready(elapsed) {
            return None;
        }

        let delta = self.baseline.encode(state);
        self.baseline.commit(state);
        Some(delta)
    }

    pub fn reset(&mut self) {
        self.baseline.reset();
        self.throttle.reset();
    }
}

/// Host-side outbound stream of enemy snapshots
#[derive(Debug, Clone)]
pub struct EnemyPublisher {
    throttle: Throttle,
}

impl EnemyPublisher {
    pub fn new(interval: Duration) -> Self {
        Self {
            throttle: Throttle::new(interval),
        }
    }

    pub fn tick(&mut self, elapsed: Duration, enemies: &[EnemySyncState]) -> Option<EnemySnapshot> {
        if !self.throttle.ready(elapsed) {
            return None;
        }
        Some(EnemySnapshot::new(enemies.to_vec()))
    }

    pub fn reset(&mut self) {
        self.throttle.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replication::Vec2;

    #[test]
    fn test_player_publisher_throttles_and_diffs() {
        let mut publisher = PlayerPublisher::new(Duration::from_millis(50));
        let mut state = PlayerState::spawn(Vec2::new(0.0, 0.0));

        assert!(publisher.tick(Duration::from_millis(20), &state).is_none());

        let first = publisher.tick(Duration::from_millis(30), &state).unwrap();
        assert!(first.limbs.is_some());

        state.position = Vec2::new(5.0, 0.0);
        let second = publisher.tick(Duration::from_millis(50), &state).unwrap();
        assert_eq!(second.x, 5.0);
        assert!(second.limbs.is_none());
    }

    #[test]
    fn test_player_publisher_reset_sends_full_state() {
        let mut publisher = PlayerPublisher::new(Duration::from_millis(50));
        let state = PlayerState::spawn(Vec2::ZERO);

        publisher.tick(Duration::from_millis(50), &state);
        publisher.reset();

        let delta = publisher.tick(Duration::from_millis(50), &state).unwrap();
        assert!(delta.facing.is_some());
    }

    #[test]
    fn test_enemy_publisher_two_hz() {
        let mut publisher = EnemyPublisher::new(Duration::from_millis(500));
        let enemies = vec![EnemySyncState {
            id: "e1".to_string(),
            x: 0.0,
            y: 0.0,
            hp: 10.0,
        }];

        let frame = Duration::from_millis(16);
        let sent = (0..125)
            .filter_map(|_| publisher.tick(frame, &enemies))
            .count();

        assert_eq!(sent, 4);
    }
}
