use crate::domain::{IceServer, RoomId};
use crate::error::Result;
use crate::infrastructure::matchbox::MatchboxConnection;
use crate::infrastructure::memory::{MemoryConnection, MemoryNetwork};
use crate::infrastructure::transport::NetworkConnection;
use async_trait::async_trait;

/// Where a transport should be opened
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub signalling_server: String,
    pub room: RoomId,
    pub ice_servers: Vec<IceServer>,
}

impl Endpoint {
    /// Matchbox room URL (`<server>/<room>`)
    pub fn room_url(&self) -> String {
        format!("{}/{}", self.signalling_server.trim_end_matches('/'), self.room)
    }
}

/// Opens transports for signaling. Lets the same signaling logic run over
/// WebRTC or the in-memory network.
#[async_trait(?Send)]
pub trait ConnectionFactory {
    type Connection: NetworkConnection;

    async fn open(&self, endpoint: &Endpoint) -> Result<Self::Connection>;
}

/// Opens matchbox WebRTC sockets
#[derive(Debug, Clone, Default)]
pub struct MatchboxConnectionFactory;

#[async_trait(?Send)]
impl ConnectionFactory for MatchboxConnectionFactory {
    type Connection = MatchboxConnection;

    async fn open(&self, endpoint: &Endpoint) -> Result<MatchboxConnection> {
        MatchboxConnection::connect(&endpoint.room_url(), &endpoint.ice_servers).await
    }
}

/// Opens peers on a shared [`MemoryNetwork`]
#[derive(Clone, Default)]
pub struct MemoryConnectionFactory {
    network: MemoryNetwork,
}

impl MemoryConnectionFactory {
    pub fn new(network: MemoryNetwork) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &MemoryNetwork {
        &self.network
    }
}

#[async_trait(?Send)]
impl ConnectionFactory for MemoryConnectionFactory {
    type Connection = MemoryConnection;

    async fn open(&self, endpoint: &Endpoint) -> Result<MemoryConnection> {
        Ok(self.network.join(endpoint.room.as_str()))
    }
}
