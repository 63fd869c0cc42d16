//! Primary-key generation for entity inserts.
//!
//! This crate resolves generation strategies for generated columns, runs
//! built-in and custom generators exactly once per row, publishes values onto
//! entities and row payloads, and reads engine-assigned keys back.

pub mod engine;
pub mod errors;
pub mod fallback;
pub mod generators;
pub mod model;
pub mod policy;

pub use engine::InsertOrchestrator;
pub use errors::GenerationError;
pub use fallback::apply_assigned;
pub use generators::{
    CustomGenerator, GeneratorRegistry, Resolution, SequentialUuidGenerator, UuidSource,
    UuidV4Generator,
};
pub use model::{InsertOptions, InsertReport, PreparedInsert};
pub use policy::{DecisionSource, GenerationDecision, ResolutionPolicy};
