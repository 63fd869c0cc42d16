use tracing::debug;

use keyforge_core::Entity;
use keyforge_gateway::{AssignedIdentifiers, PersistenceError};

use crate::errors::GenerationError;
use crate::model::PreparedInsert;

/// Write engine-assigned identifiers onto the entities of a prepared batch.
///
/// `assigned` must be aligned with the insertion order. Identifiers returned
/// for columns that were not delegated are ignored. Returns the number of
/// values written.
pub fn apply_assigned(
    prepared: &PreparedInsert,
    entities: &mut [Entity],
    assigned: &[AssignedIdentifiers],
) -> Result<usize, GenerationError> {
    if entities.len() != prepared.len() {
        return Err(GenerationError::BatchSize {
            expected: prepared.len(),
            actual: entities.len(),
        });
    }
    if assigned.len() != prepared.len() {
        return Err(PersistenceError::RowCountMismatch {
            expected: prepared.len(),
            actual: assigned.len(),
        }
        .into());
    }

    let mut written = 0;
    for (row, (entity, identifiers)) in entities.iter_mut().zip(assigned).enumerate() {
        for column in prepared.pending_columns(row) {
            let value = identifiers
                .get(column)
                .filter(|value| !value.is_null())
                .ok_or_else(|| PersistenceError::MissingIdentifier {
                    entity: prepared.entity.clone(),
                    column: column.to_string(),
                    row,
                })?;
            entity.set(column, value.clone());
            written += 1;
        }
    }

    debug!(entity = %prepared.entity, written, "engine identifiers applied");
    Ok(written)
}
