use crate::entity::Value;
use crate::error::GeneratorError;

/// Capability to produce the next value for a generated column.
///
/// Implementations may keep state across calls (a counter, a clock). The
/// insertion pipeline calls `next_value` exactly once per row and column and
/// never serializes calls across batches, so shared state must carry its own
/// synchronization.
pub trait ValueGenerator: Send + Sync {
    /// Stable identifier used in logs and diagnostics.
    fn id(&self) -> &str;

    fn next_value(&self) -> Result<Value, GeneratorError>;
}
