use crate::domain::participant::{Participant, ParticipantId};
use crate::replication::{EnemySnapshot, LimbType, PlayerDelta, Vec2};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Which weapon fired a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weapon {
    Left,
    Right,
}

/// A projectile spawned by a remote player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShotEvent {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<Weapon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Damage dealt to one limb of a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DamageEvent {
    pub target_id: ParticipantId,
    pub limb: LimbType,
    pub amount: f32,
}

/// A limb knocked off a player, flying as debris
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetachedLimb {
    pub limb_type: LimbType,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub hp: f32,
    pub max_hp: f32,
    #[serde(default)]
    pub destroyed: bool,
}

/// Typed message body. Serialized as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagePayload {
    PlayerUpdate(PlayerDelta),
    PlayerShot(ShotEvent),
    EnemySync(EnemySnapshot),
    PlayerDamage(DamageEvent),
    PlayerDied {
        id: ParticipantId,
        score: u32,
    },
    PlayerDisconnected {
        id: ParticipantId,
    },
    PlayerJoined(Participant),
    PlayerNameChange {
        id: ParticipantId,
        name: String,
    },
    GameState {
        players: Vec<Participant>,
    },
    PauseToggle {
        paused: bool,
    },
    GameStart {
        #[serde(default)]
        spawn: Vec2,
    },
    GameEnd {
        score: u32,
    },
    EnemyDied {
        id: String,
    },
    LimbLost {
        id: ParticipantId,
        limb: LimbType,
    },
    LimbDetached(DetachedLimb),
    LimbAttached {
        limb: LimbType,
    },
    StarCollected {},
}

/// Routing class of a message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCategory {
    Roster,
    Lifecycle,
    Replication,
}

/// Discriminant of [`MessagePayload`], used for logging and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    PlayerUpdate,
    PlayerShot,
    EnemySync,
    PlayerDamage,
    PlayerDied,
    PlayerDisconnected,
    PlayerJoined,
    PlayerNameChange,
    GameState,
    PauseToggle,
    GameStart,
    GameEnd,
    EnemyDied,
    LimbLost,
    LimbDetached,
    LimbAttached,
    StarCollected,
}

impl MessageKind {
    pub const ALL: [MessageKind; 17] = [
        MessageKind::PlayerUpdate,
        MessageKind::PlayerShot,
        MessageKind::EnemySync,
        MessageKind::PlayerDamage,
        MessageKind::PlayerDied,
        MessageKind::PlayerDisconnected,
        MessageKind::PlayerJoined,
        MessageKind::PlayerNameChange,
        MessageKind::GameState,
        MessageKind::PauseToggle,
        MessageKind::GameStart,
        MessageKind::GameEnd,
        MessageKind::EnemyDied,
        MessageKind::LimbLost,
        MessageKind::LimbDetached,
        MessageKind::LimbAttached,
        MessageKind::StarCollected,
    ];

    /// Look up a kind by its wire tag
    pub fn from_wire_name(name: &str) -> Option<MessageKind> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn category(self) -> MessageCategory {
        match self {
            MessageKind::PlayerJoined
            | MessageKind::PlayerDisconnected
            | MessageKind::PlayerNameChange
            | MessageKind::GameState => MessageCategory::Roster,
            MessageKind::PauseToggle | MessageKind::GameStart | MessageKind::GameEnd => {
                MessageCategory::Lifecycle
            }
            MessageKind::PlayerUpdate
            | MessageKind::PlayerShot
            | MessageKind::EnemySync
            | MessageKind::PlayerDamage
            | MessageKind::PlayerDied
            | MessageKind::EnemyDied
            | MessageKind::LimbLost
            | MessageKind::LimbDetached
            | MessageKind::LimbAttached
            | MessageKind::StarCollected => MessageCategory::Replication,
        }
    }

    /// Kinds only the host may originate.
    ///
    /// `PLAYER_DISCONNECTED` is emitted by whoever saw the connection close,
    /// which for a guest link is always the host.
    pub fn is_host_only(self) -> bool {
        matches!(
            self,
            MessageKind::GameStart
                | MessageKind::EnemySync
                | MessageKind::EnemyDied
                | MessageKind::GameState
                | MessageKind::PlayerJoined
                | MessageKind::PlayerDisconnected
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::PlayerUpdate => "PLAYER_UPDATE",
            MessageKind::PlayerShot => "PLAYER_SHOT",
            MessageKind::EnemySync => "ENEMY_SYNC",
            MessageKind::PlayerDamage => "PLAYER_DAMAGE",
            MessageKind::PlayerDied => "PLAYER_DIED",
            MessageKind::PlayerDisconnected => "PLAYER_DISCONNECTED",
            MessageKind::PlayerJoined => "PLAYER_JOINED",
            MessageKind::PlayerNameChange => "PLAYER_NAME_CHANGE",
            MessageKind::GameState => "GAME_STATE",
            MessageKind::PauseToggle => "PAUSE_TOGGLE",
            MessageKind::GameStart => "GAME_START",
            MessageKind::GameEnd => "GAME_END",
            MessageKind::EnemyDied => "ENEMY_DIED",
            MessageKind::LimbLost => "LIMB_LOST",
            MessageKind::LimbDetached => "LIMB_DETACHED",
            MessageKind::LimbAttached => "LIMB_ATTACHED",
            MessageKind::StarCollected => "STAR_COLLECTED",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MessagePayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::PlayerUpdate(_) => MessageKind::PlayerUpdate,
            MessagePayload::PlayerShot(_) => MessageKind::PlayerShot,
            MessagePayload::EnemySync(_) => MessageKind::EnemySync,
            MessagePayload::PlayerDamage(_) => MessageKind::PlayerDamage,
            MessagePayload::PlayerDied { .. } => MessageKind::PlayerDied,
            MessagePayload::PlayerDisconnected { .. } => MessageKind::PlayerDisconnected,
            MessagePayload::PlayerJoined(_) => MessageKind::PlayerJoined,
            MessagePayload::PlayerNameChange { .. } => MessageKind::PlayerNameChange,
            MessagePayload::GameState { .. } => MessageKind::GameState,
            MessagePayload::PauseToggle { .. } => MessageKind::PauseToggle,
            MessagePayload::GameStart { .. } => MessageKind::GameStart,
            MessagePayload::GameEnd { .. } => MessageKind::GameEnd,
            MessagePayload::EnemyDied { .. } => MessageKind::EnemyDied,
            MessagePayload::LimbLost { .. } => MessageKind::LimbLost,
            MessagePayload::LimbDetached(_) => MessageKind::LimbDetached,
            MessagePayload::LimbAttached { .. } => MessageKind::LimbAttached,
            MessagePayload::StarCollected {} => MessageKind::StarCollected,
        }
    }

    pub fn category(&self) -> MessageCategory {
        self.kind().category()
    }
}

/// Wire envelope: `{type, senderId, data, timestamp}`.
///
/// Immutable once built; relays forward it untouched so `sender_id` always
/// names the originator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkMessage {
    #[serde(flatten)]
    payload: MessagePayload,
    #[serde(rename = "senderId")]
    sender_id: ParticipantId,
    /// Sender-local milliseconds
    timestamp: u64,
}

impl NetworkMessage {
    pub fn new(sender_id: ParticipantId, payload: MessagePayload, timestamp: u64) -> Self {
        Self {
            payload,
            sender_id,
            timestamp,
        }
    }

    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    pub fn sender_id(&self) -> &ParticipantId {
        &self.sender_id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// JSON schema of the wire envelope
    pub fn wire_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(NetworkMessage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let msg = NetworkMessage::new(
            "host".into(),
            MessagePayload::PauseToggle { paused: true },
            1234,
        );
        let value: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "PAUSE_TOGGLE",
                "data": { "paused": true },
                "senderId": "host",
                "timestamp": 1234
            })
        );
    }

    #[test]
    fn test_decode_foreign_json() {
        let raw = br#"{
            "type": "PLAYER_DIED",
            "senderId": "peer-2",
            "data": { "id": "peer-2", "score": 900 },
            "timestamp": 42
        }"#;

        let msg = NetworkMessage::decode(raw).unwrap();

        assert_eq!(msg.sender_id().as_str(), "peer-2");
        assert_eq!(msg.timestamp(), 42);
        assert_eq!(
            msg.payload(),
            &MessagePayload::PlayerDied {
                id: "peer-2".into(),
                score: 900
            }
        );
    }

    #[test]
    fn test_decode_player_update_with_limbs() {
        let raw = br#"{
            "type": "PLAYER_UPDATE",
            "senderId": "peer-1",
            "data": { "x": 1, "y": 2, "vx": 0, "vy": 0, "limbs": { "LEFT_ARM": { "exists": false } } },
            "timestamp": 7
        }"#;

        let msg = NetworkMessage::decode(raw).unwrap();
        let MessagePayload::PlayerUpdate(delta) = msg.payload() else {
            panic!("expected PLAYER_UPDATE");
        };

        let limbs = delta.limbs.as_ref().unwrap();
        assert_eq!(limbs[&LimbType::LeftArm].exists, Some(false));
        assert_eq!(limbs[&LimbType::LeftArm].hp, None);
        assert!(delta.facing.is_none());
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let raw = br#"{"type":"WEATHER_CHANGED","senderId":"a","data":{},"timestamp":0}"#;
        assert!(matches!(
            NetworkMessage::decode(raw),
            Err(MessageError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(NetworkMessage::decode(b"\x00\x01not json").is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(MessageKind::GameState.category(), MessageCategory::Roster);
        assert_eq!(MessageKind::GameEnd.category(), MessageCategory::Lifecycle);
        assert_eq!(MessageKind::PlayerDied.category(), MessageCategory::Replication);
        assert!(MessageKind::EnemySync.is_host_only());
        assert!(!MessageKind::PauseToggle.is_host_only());
        assert!(MessageKind::PlayerDisconnected.is_host_only());
        assert!(MessageKind::EnemyDied.is_host_only());
        assert!(!MessageKind::LimbDetached.is_host_only());
        assert_eq!(MessageKind::StarCollected.category(), MessageCategory::Replication);
    }

    #[test]
    fn test_decode_debris_events() {
        let raw = br##"{
            "type": "LIMB_DETACHED",
            "senderId": "peer-3",
            "data": {
                "limbType": "RIGHT_ARM", "x": 12.5, "y": 80, "vx": -3, "vy": -6,
                "color": "#ff0", "hp": 0, "maxHp": 50, "destroyed": true
            },
            "timestamp": 9
        }"##;
        let msg = NetworkMessage::decode(raw).unwrap();
        let MessagePayload::LimbDetached(limb) = msg.payload() else {
            panic!("expected LIMB_DETACHED");
        };
        assert_eq!(limb.limb_type, LimbType::RightArm);
        assert_eq!(limb.max_hp, 50.0);
        assert!(limb.destroyed);

        let star = br#"{"type":"STAR_COLLECTED","senderId":"peer-3","data":{},"timestamp":10}"#;
        assert_eq!(
            NetworkMessage::decode(star).unwrap().kind(),
            MessageKind::StarCollected
        );

        let died = br#"{"type":"ENEMY_DIED","senderId":"host","data":{"id":"e7"},"timestamp":11}"#;
        assert_eq!(
            NetworkMessage::decode(died).unwrap().payload(),
            &MessagePayload::EnemyDied {
                id: "e7".to_string()
            }
        );
    }

    #[test]
    fn test_every_kind_tags_its_payload() {
        let payloads = [
            MessagePayload::EnemyDied { id: "e1".to_string() },
            MessagePayload::LimbLost {
                id: "a".into(),
                limb: LimbType::Head,
            },
            MessagePayload::LimbAttached {
                limb: LimbType::LeftLeg,
            },
            MessagePayload::StarCollected {},
        ];

        for payload in payloads {
            let value = serde_json::to_value(&payload).unwrap();
            assert_eq!(value["type"], payload.kind().as_str());
        }
    }

    #[test]
    fn test_kind_names_match_wire_tags() {
        let payload = MessagePayload::PlayerNameChange {
            id: "a".into(),
            name: "Ann".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["type"], payload.kind().as_str());
    }

    #[test]
    fn test_wire_name_lookup() {
        assert_eq!(
            MessageKind::from_wire_name("ENEMY_SYNC"),
            Some(MessageKind::EnemySync)
        );
        assert_eq!(MessageKind::from_wire_name("enemy_sync"), None);
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_wire_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_schema_mentions_envelope_fields() {
        let schema = serde_json::to_string(&NetworkMessage::wire_schema()).unwrap();

        assert!(schema.contains("senderId"));
        assert!(schema.contains("timestamp"));
    }
}
