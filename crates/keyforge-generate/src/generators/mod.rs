use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use keyforge_core::{ConfigurationError, EntitySchema, Strategy, ValueGenerator};

mod builtin;
mod custom;

pub use builtin::UuidV4Generator;
pub use custom::{CustomGenerator, SequentialUuidGenerator};

/// How a strategy obtains its values.
#[derive(Clone)]
pub enum Resolution {
    /// Produced in-process before the insert.
    Client(Arc<dyn ValueGenerator>),
    /// Assigned by the engine and read back after the insert.
    Database,
}

impl Resolution {
    pub fn is_database(&self) -> bool {
        matches!(self, Resolution::Database)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Client(generator) => {
                f.debug_tuple("Client").field(&generator.id()).finish()
            }
            Resolution::Database => f.write_str("Database"),
        }
    }
}

/// Where values for the `uuid` strategy come from when no custom generator is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UuidSource {
    #[default]
    Client,
    /// The engine's native UUID function (e.g. `gen_random_uuid()`).
    Database,
}

/// Built-in strategy resolutions. Read-only once shared.
#[derive(Debug, Clone)]
pub struct GeneratorRegistry {
    resolutions: HashMap<Strategy, Resolution>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::with_uuid_source(UuidSource::Client)
    }

    pub fn with_uuid_source(source: UuidSource) -> Self {
        let uuid = match source {
            UuidSource::Client => Resolution::Client(Arc::new(UuidV4Generator)),
            UuidSource::Database => Resolution::Database,
        };

        let mut resolutions = HashMap::new();
        resolutions.insert(Strategy::Uuid, uuid);
        resolutions.insert(Strategy::Increment, Resolution::Database);
        resolutions.insert(Strategy::Rowid, Resolution::Database);
        Self { resolutions }
    }

    /// Replace the resolution of a built-in strategy.
    ///
    /// `custom` columns always use their own generator and cannot be registered.
    pub fn register(
        &mut self,
        strategy: Strategy,
        resolution: Resolution,
    ) -> Result<(), ConfigurationError> {
        if strategy == Strategy::Custom {
            return Err(ConfigurationError::InvalidSchema(
                "the custom strategy takes its generator from column metadata".to_string(),
            ));
        }
        self.resolutions.insert(strategy, resolution);
        Ok(())
    }

    pub fn resolve(&self, strategy: Strategy) -> Option<&Resolution> {
        self.resolutions.get(&strategy)
    }

    /// Fail fast when a schema uses a strategy this registry cannot satisfy.
    pub fn validate(&self, schema: &EntitySchema) -> Result<(), ConfigurationError> {
        for column in schema.generated_columns() {
            if column.generator().is_some() {
                if !column.strategy().accepts_custom_generator() {
                    return Err(ConfigurationError::CustomGeneratorStrategy {
                        entity: schema.name().to_string(),
                        column: column.name().to_string(),
                        strategy: column.strategy().to_string(),
                    });
                }
                continue;
            }

            if column.strategy() == Strategy::Custom {
                return Err(ConfigurationError::MissingGenerator {
                    entity: schema.name().to_string(),
                    column: column.name().to_string(),
                });
            }

            if self.resolve(column.strategy()).is_none() {
                return Err(ConfigurationError::Unresolvable {
                    entity: schema.name().to_string(),
                    column: column.name().to_string(),
                    strategy: column.strategy().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
