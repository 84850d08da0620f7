use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "robo_";
const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Invalid room id: {0}")]
pub struct InvalidRoomId(pub String);

/// Signalling room name: `robo_` followed by nine base-36 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!("{PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = InvalidRoomId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s
            .strip_prefix(PREFIX)
            .map(|suffix| {
                suffix.len() == SUFFIX_LEN && suffix.bytes().all(|b| b.is_ascii_alphanumeric())
            })
            .unwrap_or(false);

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidRoomId(s.to_string()))
        }
    }
}

impl TryFrom<String> for RoomId {
    type Error = InvalidRoomId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomId> for String {
    fn from(room: RoomId) -> Self {
        room.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_shape() {
        let room = RoomId::generate();

        assert!(room.as_str().starts_with("robo_"));
        assert_eq!(room.as_str().len(), 14);
        assert!(room.as_str().parse::<RoomId>().is_ok());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(RoomId::generate(), RoomId::generate());
    }

    #[test]
    fn test_parse_rejects_bad_ids() {
        assert!("robo_short".parse::<RoomId>().is_err());
        assert!("game_abcdefghi".parse::<RoomId>().is_err());
        assert!("robo_abc-efghi".parse::<RoomId>().is_err());
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<RoomId>("\"robo_abcdefghi\"").is_ok());
        assert!(serde_json::from_str::<RoomId>("\"nope\"").is_err());
    }
}
