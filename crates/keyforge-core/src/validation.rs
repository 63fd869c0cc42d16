use std::collections::BTreeSet;

use crate::error::{ConfigurationError, Result};
use crate::schema::ColumnSpec;
use crate::types::Strategy;

/// Validate column declarations for one entity type.
///
/// This checks:
/// - entity and column names are non-empty
/// - column names are unique
/// - strategy tags are known
/// - generators only appear on generated columns with a UUID-like strategy
/// - `custom` columns carry a generator
///
/// Returns the parsed strategy for each column, in declaration order.
pub fn validate_columns(entity: &str, columns: &[ColumnSpec]) -> Result<Vec<Option<Strategy>>> {
    if entity.trim().is_empty() {
        return Err(ConfigurationError::InvalidSchema(
            "entity name must not be empty".to_string(),
        ));
    }
    if columns.is_empty() {
        return Err(ConfigurationError::InvalidSchema(format!(
            "entity {entity} declares no columns"
        )));
    }

    let mut seen = BTreeSet::new();
    let mut strategies = Vec::with_capacity(columns.len());

    for spec in columns {
        if spec.name.trim().is_empty() {
            return Err(ConfigurationError::InvalidSchema(format!(
                "entity {entity} has a column with an empty name"
            )));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(ConfigurationError::DuplicateColumn {
                entity: entity.to_string(),
                column: spec.name.clone(),
            });
        }

        let strategy = spec
            .strategy
            .as_deref()
            .map(str::parse::<Strategy>)
            .transpose()?;

        match (strategy, spec.generator.is_some()) {
            (None, true) => {
                return Err(ConfigurationError::MissingStrategy {
                    entity: entity.to_string(),
                    column: spec.name.clone(),
                });
            }
            (Some(strategy), true) if !strategy.accepts_custom_generator() => {
                return Err(ConfigurationError::CustomGeneratorStrategy {
                    entity: entity.to_string(),
                    column: spec.name.clone(),
                    strategy: strategy.to_string(),
                });
            }
            (Some(Strategy::Custom), false) => {
                return Err(ConfigurationError::MissingGenerator {
                    entity: entity.to_string(),
                    column: spec.name.clone(),
                });
            }
            _ => {}
        }

        strategies.push(strategy);
    }

    Ok(strategies)
}
