//! Persistence gateways consumed by the insertion pipeline.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod row;

pub use error::PersistenceError;
pub use gateway::PersistenceGateway;
pub use memory::InMemoryGateway;
pub use row::{AssignedIdentifiers, Row};
