use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use keyforge_gateway::Row;

use crate::policy::DecisionSource;

/// Options for the insertion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InsertOptions {
    /// Reject entities carrying fields the schema does not declare.
    pub reject_unknown_columns: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            reject_unknown_columns: true,
        }
    }
}

/// Rows ready for the gateway plus the per-row decisions that produced them.
#[derive(Debug, Clone)]
pub struct PreparedInsert {
    pub entity: String,
    pub rows: Vec<Row>,
    /// Decision source per generated column, aligned with `rows`.
    pub sources: Vec<BTreeMap<String, DecisionSource>>,
}

impl PreparedInsert {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns of `row` whose value the engine must supply.
    pub fn pending_columns(&self, row: usize) -> impl Iterator<Item = &str> {
        self.sources
            .get(row)
            .into_iter()
            .flatten()
            .filter(|(_, source)| **source == DecisionSource::Database)
            .map(|(column, _)| column.as_str())
    }

    pub fn count(&self, source: DecisionSource) -> usize {
        self.sources
            .iter()
            .flat_map(|row| row.values())
            .filter(|candidate| **candidate == source)
            .count()
    }
}

/// Summary of a completed insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertReport {
    pub entity: String,
    pub engine: String,
    pub rows: usize,
    pub explicit: usize,
    pub generated: usize,
    pub database_assigned: usize,
}
