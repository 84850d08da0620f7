use instant::Duration;

/// Update rate between player delta sends (20 Hz)
pub const PLAYER_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

/// Update rate between enemy snapshots (2 Hz)
pub const ENEMY_SYNC_INTERVAL: Duration = Duration::from_millis(500);

/// Interpolation window, slightly shorter than the snapshot interval
pub const INTERPOLATION_WINDOW: Duration = Duration::from_millis(450);

/// Length of one match
pub const GAME_DURATION: Duration = Duration::from_secs(300);

/// Timing knobs for replication and the match lifecycle
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationConfig {
    pub player_update_interval: Duration,
    pub enemy_sync_interval: Duration,
    pub interpolation_window: Duration,
    pub game_duration: Duration,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            player_update_interval: PLAYER_UPDATE_INTERVAL,
            enemy_sync_interval: ENEMY_SYNC_INTERVAL,
            interpolation_window: INTERPOLATION_WINDOW,
            game_duration: GAME_DURATION,
        }
    }
}

impl ReplicationConfig {
    pub fn with_player_update_interval(mut self, interval: Duration) -> Self {
        self.player_update_interval = interval;
        self
    }

    pub fn with_enemy_sync_interval(mut self, interval: Duration) -> Self {
        self.enemy_sync_interval = interval;
        self
    }

    pub fn with_interpolation_window(mut self, window: Duration) -> Self {
        self.interpolation_window = window;
        self
    }

    pub fn with_game_duration(mut self, duration: Duration) -> Self {
        self.game_duration = duration;
        self
    }

    pub fn interpolation_window_ms(&self) -> u64 {
        self.interpolation_window.as_millis() as u64
    }

    pub fn game_duration_ms(&self) -> u64 {
        self.game_duration.as_millis() as u64
    }
}
