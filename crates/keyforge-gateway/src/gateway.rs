use async_trait::async_trait;

use keyforge_core::{Entity, EntitySchema, Value};

use crate::error::PersistenceError;
use crate::row::{AssignedIdentifiers, Row};

/// Trait implemented by storage engines that can persist prepared rows.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Returns the engine identifier (e.g. `memory`).
    fn engine(&self) -> &'static str;

    /// Insert rows in order and return, per row, the values the engine
    /// assigned to columns missing from the payload.
    async fn execute_insert(
        &self,
        schema: &EntitySchema,
        rows: &[Row],
    ) -> Result<Vec<AssignedIdentifiers>, PersistenceError>;

    /// Look up a single stored entity by column value.
    async fn find_one_by(
        &self,
        entity: &str,
        column: &str,
        value: &Value,
    ) -> Result<Option<Entity>, PersistenceError>;
}
