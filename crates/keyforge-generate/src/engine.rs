use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use keyforge_core::{Entity, EntitySchema};
use keyforge_gateway::{PersistenceGateway, Row};

use crate::errors::GenerationError;
use crate::fallback::apply_assigned;
use crate::generators::GeneratorRegistry;
use crate::model::{InsertOptions, InsertReport, PreparedInsert};
use crate::policy::{DecisionSource, ResolutionPolicy};

/// Entry point for materializing generated columns before an insert.
#[derive(Debug, Clone)]
pub struct InsertOrchestrator {
    registry: Arc<GeneratorRegistry>,
    options: InsertOptions,
}

impl InsertOrchestrator {
    pub fn new(registry: Arc<GeneratorRegistry>, options: InsertOptions) -> Self {
        Self { registry, options }
    }

    /// Resolve every generated column of `entities`, in order.
    ///
    /// Generated and explicit values are written onto each entity and its
    /// row; engine-assigned columns are left out of the row and recorded as
    /// pending. Entity types and fields are checked for the whole batch before
    /// any generator runs. A generator failure aborts the batch; entities
    /// earlier in the batch keep the values already written to them.
    pub fn prepare_insert(
        &self,
        schema: &EntitySchema,
        entities: &mut [Entity],
    ) -> Result<PreparedInsert, GenerationError> {
        for (index, entity) in entities.iter().enumerate() {
            self.check_entity(schema, entity, index)?;
        }

        let policy = ResolutionPolicy::new(&self.registry);
        let mut rows = Vec::with_capacity(entities.len());
        let mut sources = Vec::with_capacity(entities.len());

        for (index, entity) in entities.iter_mut().enumerate() {
            let mut row_sources = BTreeMap::new();
            for column in schema.generated_columns() {
                let decision = policy
                    .decide(column, entity.get(column.name()))
                    .inspect_err(|err| {
                        error!(
                            entity = %schema.name(),
                            column = %column.name(),
                            row = index,
                            error = %err,
                            "generated column resolution failed"
                        );
                    })?;

                if decision.source == DecisionSource::Generator {
                    if let Some(value) = decision.value {
                        entity.set(column.name(), value);
                    }
                }
                row_sources.insert(column.name().to_string(), decision.source);
            }

            let mut row = Row::new(schema.name());
            for (column, value) in entity.fields() {
                if row_sources.get(column) == Some(&DecisionSource::Database) {
                    continue;
                }
                row.values.insert(column.to_string(), value.clone());
            }

            rows.push(row);
            sources.push(row_sources);
        }

        Ok(PreparedInsert {
            entity: schema.name().to_string(),
            rows,
            sources,
        })
    }

    /// Prepare, persist through `gateway`, and read engine-assigned keys back.
    pub async fn insert<G>(
        &self,
        gateway: &G,
        schema: &EntitySchema,
        entities: &mut [Entity],
    ) -> Result<InsertReport, GenerationError>
    where
        G: PersistenceGateway + ?Sized,
    {
        let start = Instant::now();
        let prepared = self.prepare_insert(schema, entities)?;

        info!(
            entity = %prepared.entity,
            engine = gateway.engine(),
            rows = prepared.len(),
            "insert started"
        );

        let assigned = gateway.execute_insert(schema, &prepared.rows).await?;
        let database_assigned = apply_assigned(&prepared, entities, &assigned)?;

        let report = InsertReport {
            entity: prepared.entity.clone(),
            engine: gateway.engine().to_string(),
            rows: prepared.len(),
            explicit: prepared.count(DecisionSource::Explicit),
            generated: prepared.count(DecisionSource::Generator),
            database_assigned,
        };

        info!(
            entity = %report.entity,
            rows = report.rows,
            explicit = report.explicit,
            generated = report.generated,
            database_assigned = report.database_assigned,
            duration_ms = start.elapsed().as_millis() as u64,
            "insert finished"
        );

        Ok(report)
    }

    fn check_entity(
        &self,
        schema: &EntitySchema,
        entity: &Entity,
        index: usize,
    ) -> Result<(), GenerationError> {
        if entity.entity_type() != schema.name() {
            return Err(GenerationError::EntityMismatch {
                expected: schema.name().to_string(),
                found: entity.entity_type().to_string(),
                row: index,
            });
        }

        let unknown = entity
            .fields()
            .find(|(column, _)| !schema.has_column(column));
        if let (true, Some((column, _))) = (self.options.reject_unknown_columns, unknown) {
            return Err(GenerationError::UnknownColumn {
                entity: schema.name().to_string(),
                column: column.to_string(),
                row: index,
            });
        }

        Ok(())
    }
}
