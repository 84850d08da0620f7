use crate::domain::{IceServer, PeerId, RoomId};
use crate::error::{Result, SessionError};
use crate::infrastructure::{ConnectionFactory, Endpoint, NetworkConnection};
use crate::signaling::{GuestAnswer, HostOffer, SignalingExchange};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Blob format version; anything else fails to parse
pub const SIGNALING_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OfferBlob {
    v: u8,
    room: RoomId,
    host: PeerId,
    nonce: Uuid,
    signalling: String,
    ice_servers: Vec<IceServer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AnswerBlob {
    v: u8,
    nonce: Uuid,
    guest: PeerId,
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

fn decode<T: DeserializeOwned>(blob: &str) -> std::result::Result<T, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(blob.trim())
        .map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

/// Copy-paste signaling: base64url JSON offer and answer blobs.
///
/// The answer names the guest; the host only admits guests whose answer
/// it has applied.
pub struct ManualSignaling<F> {
    factory: F,
    signalling_server: String,
    ice_servers: Vec<IceServer>,
    nonce: Option<Uuid>,
    applied: HashSet<PeerId>,
}

impl<F: ConnectionFactory> ManualSignaling<F> {
    pub fn new(factory: F, signalling_server: impl Into<String>, ice_servers: Vec<IceServer>) -> Self {
        Self {
            factory,
            signalling_server: signalling_server.into(),
            ice_servers,
            nonce: None,
            applied: HashSet::new(),
        }
    }
}

#[async_trait(?Send)]
impl<F: ConnectionFactory> SignalingExchange for ManualSignaling<F> {
    type Connection = F::Connection;

    async fn create_offer(&mut self) -> Result<HostOffer<F::Connection>> {
        let endpoint = Endpoint {
            signalling_server: self.signalling_server.clone(),
            room: RoomId::generate(),
            ice_servers: self.ice_servers.clone(),
        };

        let connection = self
            .factory
            .open(&endpoint)
            .await
            .map_err(|e| SessionError::Signaling(e.to_string()))?;
        let host = connection
            .local_peer_id()
            .ok_or_else(|| SessionError::Signaling("transport has no peer id".to_string()))?;

        let nonce = Uuid::new_v4();
        let blob = encode(&OfferBlob {
            v: SIGNALING_VERSION,
            room: endpoint.room,
            host,
            nonce,
            signalling: endpoint.signalling_server,
            ice_servers: endpoint.ice_servers,
        })?;

        self.nonce = Some(nonce);
        self.applied.clear();
        tracing::info!("📨 Created offer for host {}", host);

        Ok(HostOffer { blob, connection })
    }

    async fn create_answer(&mut self, offer: &str) -> Result<GuestAnswer<F::Connection>> {
        let offer: OfferBlob = decode(offer).map_err(SessionError::InvalidOffer)?;
        if offer.v != SIGNALING_VERSION {
            return Err(SessionError::InvalidOffer(format!(
                "unsupported version {}",
                offer.v
            )));
        }

        let endpoint = Endpoint {
            signalling_server: offer.signalling,
            room: offer.room,
            ice_servers: offer.ice_servers,
        };
        let connection = self.factory.open(&endpoint).await?;
        let guest = connection
            .local_peer_id()
            .ok_or_else(|| SessionError::Signaling("transport has no peer id".to_string()))?;

        let blob = encode(&AnswerBlob {
            v: SIGNALING_VERSION,
            nonce: offer.nonce,
            guest,
        })?;
        tracing::info!("📨 Created answer for host {}", offer.host);

        Ok(GuestAnswer {
            blob,
            host: offer.host,
            connection,
        })
    }

    fn apply_answer(&mut self, answer: &str) -> Result<Option<PeerId>> {
        let expected = self
            .nonce
            .ok_or_else(|| SessionError::InvalidAnswer("no pending offer".to_string()))?;

        let answer: AnswerBlob = decode(answer).map_err(SessionError::InvalidAnswer)?;
        if answer.v != SIGNALING_VERSION {
            return Err(SessionError::InvalidAnswer(format!(
                "unsupported version {}",
                answer.v
            )));
        }
        if answer.nonce != expected {
            return Err(SessionError::InvalidAnswer(
                "answer belongs to a different offer".to_string(),
            ));
        }
        if !self.applied.insert(answer.guest) {
            return Err(SessionError::AlreadyConnected(answer.guest.to_string()));
        }

        tracing::info!("🤝 Applied answer from guest {}", answer.guest);
        Ok(Some(answer.guest))
    }

    fn requires_answer(&self) -> bool {
        true
    }
}
