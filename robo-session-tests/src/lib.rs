use cucumber::World;
use robo_session_core::{
    ManualTimeSource, MessageKind, NetworkMessage, ParticipantId, ShotEvent,
};
use robo_session_p2p::infrastructure::MemoryConnectionFactory;
use robo_session_p2p::{
    MemoryNetwork, MemorySessionManager, RoomCodeSignaling, SessionConfig, SessionError,
    SessionManager,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Messages delivered to one participant
#[derive(Clone, Default)]
pub struct Inbox(Rc<RefCell<Vec<NetworkMessage>>>);

impl Inbox {
    pub fn count(&self, kind: MessageKind) -> usize {
        self.0.borrow().iter().filter(|m| m.kind() == kind).count()
    }
}

/// A host and its guests on an in-memory network, addressed by name
#[derive(World, Default)]
pub struct ArenaWorld {
    pub network: MemoryNetwork,
    pub time: ManualTimeSource,
    pub invite: Option<String>,
    /// Connected participants; the host comes first
    pub sessions: Vec<(String, MemorySessionManager)>,
    pub inboxes: HashMap<String, Inbox>,
    pub last_error: Option<SessionError>,
}

impl fmt::Debug for ArenaWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sessions.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("ArenaWorld")
            .field("invite", &self.invite)
            .field("sessions", &names)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl ArenaWorld {
    fn build(&self, name: &str) -> MemorySessionManager {
        let config = SessionConfig::new("memory://")
            .with_poll_interval(1)
            .with_handshake_timeout(Duration::from_millis(500))
            .with_display_name(name);
        let signaling = RoomCodeSignaling::new(
            MemoryConnectionFactory::new(self.network.clone()),
            config.signalling_server.clone(),
            config.ice_servers.clone(),
        );
        SessionManager::with_time_source(signaling, config, Arc::new(self.time.clone()))
    }

    fn attach_inbox(&mut self, name: &str, session: &mut MemorySessionManager) {
        let inbox = Inbox::default();
        let sink = inbox.0.clone();
        session.on_message(move |msg| sink.borrow_mut().push(msg.clone()));
        self.inboxes.insert(name.to_string(), inbox);
    }

    pub async fn open_host(&mut self, name: &str) {
        let mut host = self.build(name);
        self.attach_inbox(name, &mut host);
        let invite = host.init_as_host().await.expect("host should start");
        tracing::info!("🎭 {} hosts with invite {}", name, invite);
        self.invite = Some(invite);
        self.sessions.push((name.to_string(), host));
    }

    /// Join with the current invite; keeps the guest only if it got in
    pub async fn join(&mut self, name: &str) -> Result<(), SessionError> {
        let invite = self.invite.clone().expect("no session opened");
        let mut guest = self.build(name);
        self.attach_inbox(name, &mut guest);

        guest.join_as_guest(&invite).await?;
        self.pump();
        if let Err(e) = guest.await_handshake().await {
            tracing::info!("🎭 {} could not join: {}", name, e);
            return Err(e);
        }

        tracing::info!("🎭 {} joined", name);
        self.sessions.push((name.to_string(), guest));
        self.pump();
        Ok(())
    }

    /// Poll everyone until the network is quiet
    pub fn pump(&mut self) {
        for _ in 0..16 {
            let handled: usize = self.sessions.iter_mut().map(|(_, s)| s.poll()).sum();
            if handled == 0 {
                break;
            }
        }
    }

    pub fn session(&self, name: &str) -> &MemorySessionManager {
        self.sessions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
            .unwrap_or_else(|| panic!("Participant '{}' not found", name))
    }

    pub fn session_mut(&mut self, name: &str) -> &mut MemorySessionManager {
        self.sessions
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
            .unwrap_or_else(|| panic!("Participant '{}' not found", name))
    }

    pub fn id_of(&self, name: &str) -> ParticipantId {
        self.session(name)
            .local_id()
            .cloned()
            .unwrap_or_else(|| panic!("Participant '{}' has no id", name))
    }

    pub fn received(&self, name: &str, kind: MessageKind) -> usize {
        self.inboxes
            .get(name)
            .map(|inbox| inbox.count(kind))
            .unwrap_or(0)
    }

    /// Close and forget a participant
    pub fn leave(&mut self, name: &str) {
        if let Some(pos) = self.sessions.iter().position(|(n, _)| n == name) {
            let (_, mut session) = self.sessions.remove(pos);
            session.close();
            tracing::info!("🎭 {} left", name);
        }
        self.pump();
    }

    pub fn sample_shot() -> ShotEvent {
        ShotEvent {
            x: 12.0,
            y: 34.0,
            angle: 0.25,
            weapon: None,
            color: None,
        }
    }
}
