use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use keyforge_core::{Entity, EntitySchema, Strategy, Value};

use crate::error::PersistenceError;
use crate::gateway::PersistenceGateway;
use crate::row::{AssignedIdentifiers, Row};

type StoredRow = BTreeMap<String, Value>;

/// In-process engine with native auto-increment and UUID defaults.
///
/// Sequences start at 1 per entity column and move past explicit numeric
/// values, like SQLite `rowid`. Batches are all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<EngineState>,
}

#[derive(Debug, Default)]
struct EngineState {
    tables: BTreeMap<String, Vec<StoredRow>>,
    sequences: BTreeMap<String, i64>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored rows for an entity type.
    pub fn rows(&self, entity: &str) -> Result<Vec<Entity>, PersistenceError> {
        let state = self.lock()?;
        Ok(state
            .tables
            .get(entity)
            .map(|rows| rows.iter().map(|row| to_entity(entity, row)).collect())
            .unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState>, PersistenceError> {
        self.state
            .lock()
            .map_err(|_| PersistenceError::Engine("engine state lock poisoned".to_string()))
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn execute_insert(
        &self,
        schema: &EntitySchema,
        rows: &[Row],
    ) -> Result<Vec<AssignedIdentifiers>, PersistenceError> {
        let mut state = self.lock()?;
        let entity = schema.name();
        let primary = schema.primary_key().map(|column| column.name.clone());

        let mut sequences = state.sequences.clone();
        let mut staged: Vec<StoredRow> = Vec::with_capacity(rows.len());
        let mut assigned_rows = Vec::with_capacity(rows.len());

        for row in rows {
            if row.entity != entity {
                return Err(PersistenceError::Engine(format!(
                    "row for {} sent to table {entity}",
                    row.entity
                )));
            }

            let mut stored = row.values.clone();
            let mut assigned = AssignedIdentifiers::new();

            for column in schema.generated_columns() {
                let sequence_key = sequence_key(entity, column.name());
                match stored.get(column.name()).filter(|value| !value.is_null()) {
                    Some(value) => {
                        if let (true, Some(explicit)) =
                            (column.strategy().is_numeric(), value.as_i64())
                        {
                            let current = sequences.entry(sequence_key).or_insert(0);
                            *current = (*current).max(explicit);
                        }
                    }
                    None => {
                        let value = if column.strategy() == Strategy::Uuid
                            || column.strategy() == Strategy::Custom
                        {
                            Value::Uuid(uuid::Uuid::new_v4().to_string())
                        } else {
                            let current = sequences.entry(sequence_key).or_insert(0);
                            *current += 1;
                            Value::Int(*current)
                        };
                        stored.insert(column.name().to_string(), value.clone());
                        assigned.insert(column.name().to_string(), value);
                    }
                }
            }

            if let Some(primary) = primary.as_deref() {
                if let Some(key) = stored.get(primary).filter(|value| !value.is_null()) {
                    let existing = state.tables.get(entity).into_iter().flatten();
                    let clash = existing
                        .chain(staged.iter())
                        .any(|other| other.get(primary).is_some_and(|value| value.key_eq(key)));
                    if clash {
                        return Err(PersistenceError::DuplicateKey {
                            entity: entity.to_string(),
                            column: primary.to_string(),
                            value: key.to_string(),
                        });
                    }
                }
            }

            staged.push(stored);
            assigned_rows.push(assigned);
        }

        debug!(entity = %entity, rows = staged.len(), "rows inserted");
        state.sequences = sequences;
        state.tables.entry(entity.to_string()).or_default().extend(staged);

        Ok(assigned_rows)
    }

    async fn find_one_by(
        &self,
        entity: &str,
        column: &str,
        value: &Value,
    ) -> Result<Option<Entity>, PersistenceError> {
        let state = self.lock()?;
        let rows = state
            .tables
            .get(entity)
            .ok_or_else(|| PersistenceError::UnknownEntity(entity.to_string()))?;

        Ok(rows
            .iter()
            .find(|row| row.get(column).is_some_and(|stored| stored.key_eq(value)))
            .map(|row| to_entity(entity, row)))
    }
}

fn to_entity(entity: &str, row: &StoredRow) -> Entity {
    row.iter()
        .fold(Entity::new(entity), |entity, (column, value)| {
            entity.with(column.clone(), value.clone())
        })
}

fn sequence_key(entity: &str, column: &str) -> String {
    format!("{entity}.{column}")
}
