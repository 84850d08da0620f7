use crate::domain::IceServer;
use instant::Duration;
use robo_session_core::{ReplicationConfig, CAPACITY};

/// Configuration for a P2P session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Matchbox signalling server URL
    pub signalling_server: String,

    /// STUN/TURN servers handed to WebRTC
    pub ice_servers: Vec<IceServer>,

    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,

    /// How long a guest waits for the host's roster
    pub handshake_timeout: Duration,

    /// Participants allowed in, host included (at most [`CAPACITY`])
    pub capacity: usize,

    /// Local display name; hosts default to "Player 1"
    pub display_name: Option<String>,

    pub replication: ReplicationConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signalling_server: "ws://localhost:3536".to_string(),
            ice_servers: IceServer::default_stun_servers(),
            poll_interval_ms: 16,
            handshake_timeout: Duration::from_secs(15),
            capacity: CAPACITY,
            display_name: None,
            replication: ReplicationConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(signalling_server: impl Into<String>) -> Self {
        Self {
            signalling_server: signalling_server.into(),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_ice_servers(mut self, servers: Vec<IceServer>) -> Self {
        self.ice_servers = servers;
        self
    }

    pub fn with_turn_server(
        mut self,
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        self.ice_servers
            .push(IceServer::turn(url, username, credential));
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Clamped to `1..=CAPACITY`
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.clamp(1, CAPACITY);
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_replication(mut self, replication: ReplicationConfig) -> Self {
        self.replication = replication;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();

        assert_eq!(config.handshake_timeout, Duration::from_secs(15));
        assert_eq!(config.capacity, 4);
        assert!(!config.ice_servers.is_empty());
        assert!(config.display_name.is_none());
    }

    #[test]
    fn test_turn_server_appended() {
        let config = SessionConfig::new("wss://signal.example.com").with_turn_server(
            "turn:relay.example.com:3478",
            "user",
            "secret",
        );

        assert_eq!(config.signalling_server, "wss://signal.example.com");
        assert!(config.ice_servers.last().unwrap().is_turn());
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(SessionConfig::default().with_capacity(10).capacity, 4);
        assert_eq!(SessionConfig::default().with_capacity(0).capacity, 1);
        assert_eq!(SessionConfig::default().with_capacity(2).capacity, 2);
    }
}
