use thiserror::Error;

/// Errors raised while registering entity schemas or resolving strategies.
///
/// These surface at startup; none of them is recoverable per insert.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The strategy tag is not one of the supported tags.
    #[error("unknown generation strategy: {0}")]
    UnknownStrategy(String),
    /// A custom generator was attached to a strategy that cannot take client values.
    #[error("custom generator on {entity}.{column} requires the uuid strategy, found {strategy}")]
    CustomGeneratorStrategy {
        entity: String,
        column: String,
        strategy: String,
    },
    /// A `custom` column was declared without a generator.
    #[error("column {entity}.{column} uses the custom strategy but has no generator")]
    MissingGenerator { entity: String, column: String },
    /// A generator was attached to a column that is not generated.
    #[error("column {entity}.{column} has a generator but no strategy")]
    MissingStrategy { entity: String, column: String },
    #[error("duplicate column name: {entity}.{column}")]
    DuplicateColumn { entity: String, column: String },
    /// The registry has no way to produce values for this strategy.
    #[error("strategy {strategy} for {entity}.{column} cannot be resolved")]
    Unresolvable {
        entity: String,
        column: String,
        strategy: String,
    },
    #[error("invalid entity schema: {0}")]
    InvalidSchema(String),
}

/// Failure reported by a value generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GeneratorError {
    message: String,
}

impl GeneratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convenience alias for schema registration results.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
