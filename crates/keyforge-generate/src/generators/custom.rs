use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use keyforge_core::{GeneratorError, Value, ValueGenerator};

type Produce = dyn Fn() -> Result<Value, GeneratorError> + Send + Sync;

/// Adapter turning a zero-argument function into a [`ValueGenerator`].
///
/// Every `next_value` call forwards to exactly one call of the wrapped
/// function. Nothing is cached; any state lives in the closure.
pub struct CustomGenerator {
    id: String,
    produce: Box<Produce>,
}

impl CustomGenerator {
    pub fn from_fn<F, V>(id: impl Into<String>, produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            id: id.into(),
            produce: Box::new(move || -> Result<Value, GeneratorError> {
                Ok(produce().into())
            }),
        }
    }

    pub fn try_from_fn<F, V>(id: impl Into<String>, produce: F) -> Self
    where
        F: Fn() -> Result<V, GeneratorError> + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            id: id.into(),
            produce: Box::new(move || -> Result<Value, GeneratorError> {
                produce().map(Into::into)
            }),
        }
    }
}

impl ValueGenerator for CustomGenerator {
    fn id(&self) -> &str {
        &self.id
    }

    fn next_value(&self) -> Result<Value, GeneratorError> {
        (self.produce)()
    }
}

impl fmt::Debug for CustomGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomGenerator").field("id", &self.id).finish()
    }
}

const SEQUENTIAL_PREFIX: &str = "00000000-0000-4000-8000-";
const SEQUENTIAL_MAX: u64 = 999_999_999_999;

/// Counter formatted as `00000000-0000-4000-8000-XXXXXXXXXXXX`.
///
/// The counter is atomic, so one instance may back several schemas or
/// concurrent batches; each call consumes one number.
#[derive(Debug)]
pub struct SequentialUuidGenerator {
    next: AtomicU64,
}

impl SequentialUuidGenerator {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Number the next call will format.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    pub fn reset(&self, start: u64) {
        self.next.store(start, Ordering::SeqCst);
    }

    pub fn format(counter: u64) -> String {
        format!("{SEQUENTIAL_PREFIX}{counter:012}")
    }
}

impl Default for SequentialUuidGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ValueGenerator for SequentialUuidGenerator {
    fn id(&self) -> &str {
        "custom.sequential_uuid"
    }

    fn next_value(&self) -> Result<Value, GeneratorError> {
        let counter = self.next.fetch_add(1, Ordering::SeqCst);
        if counter > SEQUENTIAL_MAX {
            return Err(GeneratorError::new(format!(
                "sequential uuid counter exhausted at {counter}"
            )));
        }
        Ok(Value::Uuid(Self::format(counter)))
    }
}
