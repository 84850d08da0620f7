mod ice_server;
mod invite;
mod peer;
mod room;

pub use ice_server::IceServer;
pub use invite::{InviteError, InviteToken, ROOM_QUERY_PARAM};
pub use peer::{MatchboxPeerId, PeerId};
pub use room::{InvalidRoomId, RoomId};
