use robo_session_core::{MessageKind, MessagePayload, NetworkMessage, ParticipantId, Role};
use std::fmt;

/// What to do with one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Hand to local consumers; when `relay` is set, first forward the
    /// untouched bytes to every other guest
    Deliver { relay: bool },
    Drop(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Only the host may originate this kind
    HostOnly(MessageKind),
    /// `senderId` does not match the channel it arrived on
    SenderMismatch,
    /// Message speaks for a participant other than its sender
    ForeignParticipant(ParticipantId),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::HostOnly(kind) => write!(f, "{kind} is host-only"),
            DropReason::SenderMismatch => write!(f, "sender id does not match channel"),
            DropReason::ForeignParticipant(id) => write!(f, "acts on behalf of {id}"),
        }
    }
}

/// Relay policy of the star topology.
///
/// Hosts validate guest traffic and fan it out; guests only ever hear from
/// the host and consume everything locally.
pub fn route(role: Role, msg: &NetworkMessage, from: &ParticipantId) -> RouteDecision {
    match role {
        Role::Guest => RouteDecision::Deliver { relay: false },
        Role::Host => {
            let kind = msg.kind();
            if kind.is_host_only() {
                return RouteDecision::Drop(DropReason::HostOnly(kind));
            }
            if msg.sender_id() != from {
                return RouteDecision::Drop(DropReason::SenderMismatch);
            }

            let subject = match msg.payload() {
                MessagePayload::PlayerNameChange { id, .. }
                | MessagePayload::PlayerDied { id, .. }
                | MessagePayload::LimbLost { id, .. } => Some(id),
                _ => None,
            };
            if let Some(id) = subject {
                if id != from {
                    return RouteDecision::Drop(DropReason::ForeignParticipant(id.clone()));
                }
            }

            RouteDecision::Deliver { relay: true }
        }
    }
}
