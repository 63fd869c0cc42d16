use thiserror::Error;

use keyforge_core::{ConfigurationError, GeneratorError};
use keyforge_gateway::PersistenceError;

/// Errors emitted while preparing or completing an insert.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A generator failed; the batch is aborted before anything is persisted.
    #[error("generator {generator} for {entity}.{column} failed: {source}")]
    GeneratorInvocation {
        entity: String,
        column: String,
        generator: String,
        #[source]
        source: GeneratorError,
    },
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("row {row} is a {found} entity but the schema is {expected}")]
    EntityMismatch {
        expected: String,
        found: String,
        row: usize,
    },
    #[error("row {row} sets column {column}, which is not declared on {entity}")]
    UnknownColumn {
        entity: String,
        column: String,
        row: usize,
    },
    #[error("prepared {expected} rows but received {actual} entities")]
    BatchSize { expected: usize, actual: usize },
}
