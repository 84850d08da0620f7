use crate::domain::PeerId;
use std::fmt;

/// Externally visible connectivity, reported to status observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Session lifecycle.
///
/// `Idle → Initializing → (AwaitingGuests | AwaitingHostAck) → Active → Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    /// Host is reachable, no guest yet
    AwaitingGuests,
    /// Guest transport is open, host roster not yet received
    AwaitingHostAck,
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// One channel of the star: host to guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub peer: PeerId,
    pub state: ConnectionState,
}

impl Connection {
    pub fn connecting(peer: PeerId) -> Self {
        Self {
            peer,
            state: ConnectionState::Connecting,
        }
    }

    pub fn open(peer: PeerId) -> Self {
        Self {
            peer,
            state: ConnectionState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}
