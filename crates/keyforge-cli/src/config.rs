use std::path::Path;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use keyforge_core::{ColumnSpec, ConfigurationError, EntitySchema};
use keyforge_generate::{GeneratorRegistry, InsertOptions, SequentialUuidGenerator, UuidSource};

use crate::CliError;

/// Contents of `keyforge.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeyforgeConfig {
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub insert: InsertOptions,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegistrySettings {
    #[serde(default)]
    pub uuid_source: UuidSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntityConfig {
    pub name: String,
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub nullable: bool,
    /// Strategy tag: `increment`, `uuid`, `rowid` or `custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
}

/// Custom generators that can be declared from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    SequentialUuid {
        #[serde(default = "default_start")]
        start: u64,
    },
}

fn default_start() -> u64 {
    1
}

impl KeyforgeConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn registry(&self) -> GeneratorRegistry {
        GeneratorRegistry::with_uuid_source(self.registry.uuid_source)
    }

    pub fn insert_options(&self) -> InsertOptions {
        self.insert.clone()
    }

    /// Register every entity; fails on the first invalid declaration.
    pub fn schemas(&self) -> Result<Vec<EntitySchema>, ConfigurationError> {
        self.entities.iter().map(EntityConfig::schema).collect()
    }
}

impl EntityConfig {
    pub fn schema(&self) -> Result<EntitySchema, ConfigurationError> {
        self.columns
            .iter()
            .fold(EntitySchema::builder(&self.name), |builder, column| {
                builder.column(column.spec())
            })
            .build()
    }
}

impl ColumnConfig {
    fn spec(&self) -> ColumnSpec {
        let mut spec = ColumnSpec::new(&self.name);
        if self.primary {
            spec = spec.primary();
        }
        if self.nullable {
            spec = spec.nullable();
        }
        if let Some(strategy) = &self.strategy {
            spec = spec.generated(strategy);
        }
        match &self.generator {
            Some(GeneratorConfig::SequentialUuid { start }) => {
                spec.shared_generator(Arc::new(SequentialUuidGenerator::new(*start)))
            }
            None => spec,
        }
    }
}

pub fn config_json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(KeyforgeConfig)).unwrap_or_default()
}
