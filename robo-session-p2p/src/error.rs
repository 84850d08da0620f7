use robo_session_core::{MessageError, ParticipantError, RosterError};

/// Errors surfaced by the session layer
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Signaling failed: {0}")]
    Signaling(String),

    #[error("Invalid offer: {0}")]
    InvalidOffer(String),

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Peer already connected: {0}")]
    AlreadyConnected(String),

    #[error("Timed out after {0} ms waiting for the host")]
    ConnectionTimeout(u64),

    #[error("Room is full")]
    RoomFull,

    #[error("Peer error: {0}")]
    PeerError(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    MalformedMessage(#[from] MessageError),

    #[error("Not connected")]
    NotConnected,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Participant error: {0}")]
    Participant(#[from] ParticipantError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
