mod config;
mod observers;
pub mod router;
mod session_manager;
mod status;

pub use config::SessionConfig;
pub use observers::{Observers, SubscriptionId};
pub use router::{route, DropReason, RouteDecision};
pub use session_manager::{
    ManualSessionManager, MatchboxSessionManager, MemorySessionManager, SessionManager,
};
pub use status::{Connection, ConnectionState, ConnectionStatus, SessionState};
