use crate::domain::{IceServer, InviteToken, PeerId, RoomId};
use crate::error::{Result, SessionError};
use crate::infrastructure::{ConnectionFactory, Endpoint, NetworkConnection};
use crate::signaling::{GuestAnswer, HostOffer, SignalingExchange};
use async_trait::async_trait;

/// Room-code signaling: the offer is a short invite token resolved through
/// the signalling server; there is no answer to hand back.
pub struct RoomCodeSignaling<F> {
    factory: F,
    signalling_server: String,
    ice_servers: Vec<IceServer>,
}

impl<F: ConnectionFactory> RoomCodeSignaling<F> {
    pub fn new(factory: F, signalling_server: impl Into<String>, ice_servers: Vec<IceServer>) -> Self {
        Self {
            factory,
            signalling_server: signalling_server.into(),
            ice_servers,
        }
    }

    fn endpoint(&self, room: RoomId) -> Endpoint {
        Endpoint {
            signalling_server: self.signalling_server.clone(),
            room,
            ice_servers: self.ice_servers.clone(),
        }
    }
}

#[async_trait(?Send)]
impl<F: ConnectionFactory> SignalingExchange for RoomCodeSignaling<F> {
    type Connection = F::Connection;

    async fn create_offer(&mut self) -> Result<HostOffer<F::Connection>> {
        let endpoint = self.endpoint(RoomId::generate());
        let connection = self
            .factory
            .open(&endpoint)
            .await
            .map_err(|e| SessionError::Signaling(e.to_string()))?;
        let host = connection
            .local_peer_id()
            .ok_or_else(|| SessionError::Signaling("transport has no peer id".to_string()))?;

        let token = InviteToken::new(endpoint.room, host);
        tracing::info!("🎟️ Room code: {}", token);

        Ok(HostOffer {
            blob: token.to_string(),
            connection,
        })
    }

    async fn create_answer(&mut self, offer: &str) -> Result<GuestAnswer<F::Connection>> {
        let token =
            InviteToken::parse_any(offer).map_err(|e| SessionError::InvalidOffer(e.to_string()))?;

        let connection = self.factory.open(&self.endpoint(token.room.clone())).await?;

        Ok(GuestAnswer {
            blob: String::new(),
            host: token.host,
            connection,
        })
    }

    fn apply_answer(&mut self, _answer: &str) -> Result<Option<PeerId>> {
        Ok(None)
    }

    fn requires_answer(&self) -> bool {
        false
    }
}
