#![allow(dead_code)]

use robo_session_core::{ManualTimeSource, MessageKind, NetworkMessage, ParticipantId, ReplicationConfig};
use robo_session_p2p::infrastructure::MemoryConnectionFactory;
use robo_session_p2p::{
    MemoryNetwork, MemorySessionManager, Result, RoomCodeSignaling, SessionConfig, SessionManager,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("robo_session_p2p=debug,robo_session_core=debug")
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> SessionConfig {
    SessionConfig::new("memory://")
        .with_poll_interval(1)
        .with_handshake_timeout(Duration::from_millis(500))
}

/// Messages seen by one participant's message observer
#[derive(Clone, Default)]
pub struct Inbox(Rc<RefCell<Vec<NetworkMessage>>>);

impl Inbox {
    pub fn attach(session: &mut MemorySessionManager) -> Self {
        let inbox = Self::default();
        let sink = inbox.0.clone();
        session.on_message(move |msg| sink.borrow_mut().push(msg.clone()));
        inbox
    }

    pub fn of_kind(&self, kind: MessageKind) -> Vec<NetworkMessage> {
        self.0
            .borrow()
            .iter()
            .filter(|m| m.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.of_kind(kind).len()
    }
}

/// Host plus guests on one in-memory network, sharing a hand-driven clock
pub struct SessionFixture {
    pub network: MemoryNetwork,
    pub time: ManualTimeSource,
    pub config: SessionConfig,
    pub host: MemorySessionManager,
    pub guests: Vec<MemorySessionManager>,
    pub invite: String,
}

impl SessionFixture {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_replication(replication: ReplicationConfig) -> Self {
        Self::with_config(test_config().with_replication(replication)).await
    }

    pub async fn with_config(config: SessionConfig) -> Self {
        init_tracing();

        let network = MemoryNetwork::new();
        let time = ManualTimeSource::new();
        let mut host = Self::build(&network, &time, config.clone());
        let invite = host.init_as_host().await.expect("host should start");

        Self {
            network,
            time,
            config,
            host,
            guests: Vec::new(),
            invite,
        }
    }

    fn build(
        network: &MemoryNetwork,
        time: &ManualTimeSource,
        config: SessionConfig,
    ) -> MemorySessionManager {
        let signaling = RoomCodeSignaling::new(
            MemoryConnectionFactory::new(network.clone()),
            config.signalling_server.clone(),
            config.ice_servers.clone(),
        );
        SessionManager::with_time_source(signaling, config, Arc::new(time.clone()))
    }

    /// Fresh, unconnected session on the fixture's network
    pub fn session(&self, name: Option<&str>) -> MemorySessionManager {
        let mut config = self.config.clone();
        config.display_name = name.map(str::to_string);
        Self::build(&self.network, &self.time, config)
    }

    /// Try to bring a new guest in; the guest is handed back either way
    pub async fn connect(&mut self, name: Option<&str>) -> (MemorySessionManager, Result<()>) {
        let mut guest = self.session(name);
        if let Err(e) = guest.join_as_guest(&self.invite).await {
            return (guest, Err(e));
        }
        self.host.poll();
        let result = guest.await_handshake().await;
        (guest, result)
    }

    /// Connect a guest that must be accepted. Returns its index.
    pub async fn add_guest(&mut self, name: Option<&str>) -> usize {
        let (guest, result) = self.connect(name).await;
        result.expect("guest should connect");
        self.guests.push(guest);
        self.pump();
        self.guests.len() - 1
    }

    /// Poll everyone until the network is quiet
    pub fn pump(&mut self) {
        for _ in 0..16 {
            let mut handled = self.host.poll();
            for guest in &mut self.guests {
                handled += guest.poll();
            }
            if handled == 0 {
                break;
            }
        }
    }

    pub fn host_id(&self) -> ParticipantId {
        self.host.local_id().cloned().expect("host has an id")
    }

    pub fn guest_id(&self, index: usize) -> ParticipantId {
        self.guests[index]
            .local_id()
            .cloned()
            .expect("guest has an id")
    }
}
