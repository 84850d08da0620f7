use crate::application::status::ConnectionStatus;
use robo_session_core::{NetworkMessage, Roster};

/// Handle returned by every `on_*` registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type MessageCallback = Box<dyn FnMut(&NetworkMessage)>;
pub type StatusCallback = Box<dyn FnMut(ConnectionStatus)>;
pub type RosterCallback = Box<dyn FnMut(&Roster)>;

/// Registered collaborator callbacks. Delivery order is unspecified.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    messages: Vec<(SubscriptionId, MessageCallback)>,
    statuses: Vec<(SubscriptionId, StatusCallback)>,
    rosters: Vec<(SubscriptionId, RosterCallback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub fn on_message(&mut self, callback: MessageCallback) -> SubscriptionId {
        let id = self.next();
        self.messages.push((id, callback));
        id
    }

    pub fn on_status(&mut self, callback: StatusCallback) -> SubscriptionId {
        let id = self.next();
        self.statuses.push((id, callback));
        id
    }

    pub fn on_roster(&mut self, callback: RosterCallback) -> SubscriptionId {
        let id = self.next();
        self.rosters.push((id, callback));
        id
    }

    /// Returns `false` if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.len();
        self.messages.retain(|(sid, _)| *sid != id);
        self.statuses.retain(|(sid, _)| *sid != id);
        self.rosters.retain(|(sid, _)| *sid != id);
        self.len() != before
    }

    pub fn notify_message(&mut self, msg: &NetworkMessage) {
        for (_, callback) in &mut self.messages {
            callback(msg);
        }
    }

    pub fn notify_status(&mut self, status: ConnectionStatus) {
        for (_, callback) in &mut self.statuses {
            callback(status);
        }
    }

    pub fn notify_roster(&mut self, roster: &Roster) {
        for (_, callback) in &mut self.rosters {
            callback(roster);
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len() + self.statuses.len() + self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
