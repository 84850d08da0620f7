use crate::domain::peer::PeerId;
use crate::domain::room::RoomId;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Query parameter carrying the token in invite links
pub const ROOM_QUERY_PARAM: &str = "room";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InviteError {
    #[error("Malformed invite token: {0}")]
    Malformed(String),

    #[error("Invite link has no '{}' parameter", ROOM_QUERY_PARAM)]
    MissingRoom,

    #[error("Invalid invite link: {0}")]
    InvalidLink(#[from] url::ParseError),
}

/// Shareable room code: `robo_<9 chars>.<host peer id>`.
///
/// Carries no integrity protection; whoever holds it can join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteToken {
    pub room: RoomId,
    pub host: PeerId,
}

impl InviteToken {
    pub fn new(room: RoomId, host: PeerId) -> Self {
        Self { room, host }
    }

    /// Embed the token in `base` as `?room=<token>`
    pub fn to_link(&self, base: &Url) -> Url {
        let mut link = base.clone();
        link.query_pairs_mut()
            .clear()
            .append_pair(ROOM_QUERY_PARAM, &self.to_string());
        link
    }

    pub fn from_link(link: &str) -> Result<Self, InviteError> {
        let url = Url::parse(link)?;
        let token = url
            .query_pairs()
            .find(|(key, _)| key == ROOM_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
            .ok_or(InviteError::MissingRoom)?;
        token.parse()
    }

    /// Accept either a bare token or an invite link
    pub fn parse_any(input: &str) -> Result<Self, InviteError> {
        let input = input.trim();
        if input.contains("://") {
            Self::from_link(input)
        } else {
            input.parse()
        }
    }
}

impl fmt::Display for InviteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.room, self.host)
    }
}

impl FromStr for InviteToken {
    type Err = InviteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (room, host) = s
            .split_once('.')
            .ok_or_else(|| InviteError::Malformed(s.to_string()))?;

        let room = room
            .parse::<RoomId>()
            .map_err(|e| InviteError::Malformed(e.to_string()))?;
        let host = host
            .parse::<PeerId>()
            .map_err(|e| InviteError::Malformed(e.to_string()))?;

        Ok(Self { room, host })
    }
}
