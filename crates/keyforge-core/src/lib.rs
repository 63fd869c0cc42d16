//! Core contracts for keyforge.
//!
//! This crate defines entity schemas, generated-column metadata, cell values
//! and the generator contract shared by the insertion pipeline, gateways and
//! the CLI.

pub mod entity;
pub mod error;
pub mod generator;
pub mod schema;
pub mod types;
pub mod validation;

pub use entity::{Entity, Value};
pub use error::{ConfigurationError, GeneratorError, Result};
pub use generator::ValueGenerator;
pub use schema::{Column, ColumnSpec, EntitySchema, EntitySchemaBuilder, GeneratedColumn};
pub use types::Strategy;
pub use validation::validate_columns;
