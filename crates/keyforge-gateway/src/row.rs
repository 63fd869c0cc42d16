use std::collections::BTreeMap;

use keyforge_core::Value;

/// Outgoing insert payload for one entity.
///
/// Columns left to the engine are absent so the engine applies its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub entity: String,
    pub values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// Engine-assigned values for one inserted row, keyed by column.
pub type AssignedIdentifiers = BTreeMap<String, Value>;
