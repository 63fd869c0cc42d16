use thiserror::Error;

/// Errors raised while persisting rows or reading engine-assigned keys.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PersistenceError {
    /// The engine rejected or failed the operation.
    #[error("engine error: {0}")]
    Engine(String),
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("duplicate primary key {value} for {entity}.{column}")]
    DuplicateKey {
        entity: String,
        column: String,
        value: String,
    },
    /// The engine reported success but returned no key for a delegated column.
    #[error("engine returned no identifier for {entity}.{column} on row {row}")]
    MissingIdentifier {
        entity: String,
        column: String,
        row: usize,
    },
    #[error("engine returned {actual} identifier rows for {expected} inserted rows")]
    RowCountMismatch { expected: usize, actual: usize },
}
