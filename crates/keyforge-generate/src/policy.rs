use serde::{Deserialize, Serialize};

use keyforge_core::{
    ConfigurationError, GeneratedColumn, GeneratorError, Value, ValueGenerator,
};

use crate::errors::GenerationError;
use crate::generators::{GeneratorRegistry, Resolution};

/// Where the final value of a generated column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The entity already carried a value.
    Explicit,
    /// A built-in or custom generator produced the value.
    Generator,
    /// The engine assigns the value during the insert.
    Database,
}

/// Outcome of resolving one generated column for one insertion attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationDecision {
    pub should_generate: bool,
    pub source: DecisionSource,
    pub value: Option<Value>,
}

impl GenerationDecision {
    fn explicit(value: Value) -> Self {
        Self {
            should_generate: false,
            source: DecisionSource::Explicit,
            value: Some(value),
        }
    }

    fn generated(value: Value) -> Self {
        Self {
            should_generate: true,
            source: DecisionSource::Generator,
            value: Some(value),
        }
    }

    fn database() -> Self {
        Self {
            should_generate: true,
            source: DecisionSource::Database,
            value: None,
        }
    }
}

/// Decides, per column and row, whether and how a value is generated.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionPolicy<'a> {
    registry: &'a GeneratorRegistry,
}

impl<'a> ResolutionPolicy<'a> {
    pub fn new(registry: &'a GeneratorRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `column` given the entity's current value.
    ///
    /// `None` (undefined) and `Some(Value::Null)` behave identically. At most
    /// one generator call is made.
    pub fn decide(
        &self,
        column: &GeneratedColumn,
        current: Option<&Value>,
    ) -> Result<GenerationDecision, GenerationError> {
        if let Some(value) = current.filter(|value| !value.is_null()) {
            return Ok(GenerationDecision::explicit(value.clone()));
        }

        if let Some(generator) = column.generator() {
            if !column.strategy().accepts_custom_generator() {
                return Err(ConfigurationError::CustomGeneratorStrategy {
                    entity: column.entity().to_string(),
                    column: column.name().to_string(),
                    strategy: column.strategy().to_string(),
                }
                .into());
            }
            return invoke(column, generator.as_ref()).map(GenerationDecision::generated);
        }

        match self.registry.resolve(column.strategy()) {
            Some(Resolution::Client(generator)) => {
                invoke(column, generator.as_ref()).map(GenerationDecision::generated)
            }
            Some(Resolution::Database) | None => Ok(GenerationDecision::database()),
        }
    }
}

fn invoke(
    column: &GeneratedColumn,
    generator: &dyn ValueGenerator,
) -> Result<Value, GenerationError> {
    generator
        .next_value()
        .and_then(|value| match value {
            Value::Null => Err(GeneratorError::new("generator returned null")),
            value => Ok(value),
        })
        .map_err(|source| GenerationError::GeneratorInvocation {
            entity: column.entity().to_string(),
            column: column.name().to_string(),
            generator: generator.id().to_string(),
            source,
        })
}
