use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of entries in the player color palette
pub const PALETTE_LEN: usize = 4;

/// Longest accepted display name, in characters
pub const MAX_NAME_LEN: usize = 32;

/// Transport-assigned participant identity.
///
/// Opaque to the session layer: it is whatever the transport hands out on
/// connect and stays stable for the lifetime of that connection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Role within the session - determines simulation authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Role {
    /// Runs the authoritative simulation (enemies, lifecycle)
    Host,
    /// Renders and forwards its own avatar state to the host
    Guest,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "Host"),
            Role::Guest => write!(f, "Guest"),
        }
    }
}

/// Errors that can occur when working with participants
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParticipantError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name must be between 1 and {} characters", MAX_NAME_LEN)]
    InvalidNameLength,

    #[error("Participant id cannot be empty")]
    EmptyId,
}

/// A connected player as seen by the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    id: ParticipantId,
    #[serde(rename = "name")]
    display_name: String,
    color_index: usize,
    role: Role,
}

impl Participant {
    /// Create the host entry (always color 0)
    pub fn new_host(id: ParticipantId, display_name: String) -> Result<Self, ParticipantError> {
        Self::new(id, display_name, 0, Role::Host)
    }

    /// Create a guest entry with the given palette slot
    pub fn new_guest(
        id: ParticipantId,
        display_name: String,
        color_index: usize,
    ) -> Result<Self, ParticipantError> {
        Self::new(id, display_name, color_index, Role::Guest)
    }

    fn new(
        id: ParticipantId,
        display_name: String,
        color_index: usize,
        role: Role,
    ) -> Result<Self, ParticipantError> {
        if id.as_str().is_empty() {
            return Err(ParticipantError::EmptyId);
        }
        Self::validate_name(&display_name)?;

        Ok(Participant {
            id,
            display_name,
            color_index: color_index % PALETTE_LEN,
            role,
        })
    }

    /// Validate a display name
    pub fn validate_name(name: &str) -> Result<(), ParticipantError> {
        if name.trim().is_empty() {
            return Err(ParticipantError::EmptyName);
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(ParticipantError::InvalidNameLength);
        }

        Ok(())
    }

    /// Default name the host hands out to the n-th participant (0-based)
    pub fn default_name(slot: usize) -> String {
        format!("Player {}", slot + 1)
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_host(&self) -> bool {
        matches!(self.role, Role::Host)
    }

    pub fn rename(&mut self, display_name: String) -> Result<(), ParticipantError> {
        Self::validate_name(&display_name)?;
        self.display_name = display_name;
        Ok(())
    }
}
