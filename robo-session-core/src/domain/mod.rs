pub mod message;
pub mod participant;
pub mod roster;

pub use message::{
    DamageEvent, DetachedLimb, MessageCategory, MessageError, MessageKind, MessagePayload,
    NetworkMessage, ShotEvent, Weapon,
};
pub use participant::{
    Participant, ParticipantError, ParticipantId, Role, MAX_NAME_LEN, PALETTE_LEN,
};
pub use roster::{Roster, RosterError, CAPACITY};
