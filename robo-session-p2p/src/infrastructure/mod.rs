pub mod factory;
pub mod matchbox;
pub mod memory;
pub(crate) mod platform;
pub mod transport;

pub use factory::{ConnectionFactory, Endpoint, MatchboxConnectionFactory, MemoryConnectionFactory};
pub use matchbox::MatchboxConnection;
pub use memory::{MemoryConnection, MemoryNetwork};
pub use transport::{ConnectionEvent, Delivery, NetworkConnection};
