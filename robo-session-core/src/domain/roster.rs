use crate::domain::participant::{Participant, ParticipantError, ParticipantId, PALETTE_LEN};
use std::collections::HashMap;

/// Maximum number of participants in one session, host included
pub const CAPACITY: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RosterError {
    #[error("Roster is full ({} participants)", CAPACITY)]
    Full,

    #[error("Roster already has a host: {0}")]
    DuplicateHost(ParticipantId),

    #[error("Participant not found: {0}")]
    NotFound(ParticipantId),

    #[error(transparent)]
    Participant(#[from] ParticipantError),
}

/// Participant table keyed by transport id.
///
/// The host owns the authoritative copy; guests keep a replica that is
/// overwritten by every `GAME_STATE` snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    participants: HashMap<ParticipantId, Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a participant.
    ///
    /// Replacing an existing id never counts against capacity.
    pub fn insert(&mut self, participant: Participant) -> Result<(), RosterError> {
        let replacing = self.participants.contains_key(participant.id());

        if !replacing && self.is_full() {
            return Err(RosterError::Full);
        }

        if participant.is_host() {
            if let Some(host) = self.host() {
                if host.id() != participant.id() {
                    return Err(RosterError::DuplicateHost(host.id().clone()));
                }
            }
        }

        tracing::debug!(
            "👤 Roster {} {} ({}, color {})",
            if replacing { "updated" } else { "added" },
            participant.id(),
            participant.role(),
            participant.color_index()
        );

        self.participants
            .insert(participant.id().clone(), participant);
        Ok(())
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        let removed = self.participants.remove(id);
        if removed.is_some() {
            tracing::debug!("👋 Roster removed {}", id);
        }
        removed
    }

    pub fn rename(&mut self, id: &ParticipantId, name: String) -> Result<(), RosterError> {
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| RosterError::NotFound(id.clone()))?;
        participant.rename(name)?;
        Ok(())
    }

    /// Overwrite the whole table with a host snapshot.
    ///
    /// The snapshot is validated first; on error the roster is unchanged.
    pub fn replace_all(&mut self, snapshot: Vec<Participant>) -> Result<(), RosterError> {
        let mut next = Roster::new();
        for participant in snapshot {
            next.insert(participant)?;
        }
        *self = next;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    pub fn host(&self) -> Option<&Participant> {
        self.participants.values().find(|p| p.is_host())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= CAPACITY
    }

    /// Palette slot handed to the next participant that joins
    pub fn next_color_index(&self) -> usize {
        self.participants.len() % PALETTE_LEN
    }

    /// Participants sorted by color index (ties broken by id)
    pub fn participants(&self) -> Vec<&Participant> {
        let mut list: Vec<&Participant> = self.participants.values().collect();
        list.sort_by(|a, b| {
            a.color_index()
                .cmp(&b.color_index())
                .then_with(|| a.id().cmp(b.id()))
        });
        list
    }

    /// Owned snapshot, in display order, for `GAME_STATE`
    pub fn snapshot(&self) -> Vec<Participant> {
        self.participants().into_iter().cloned().collect()
    }
}
