use keyforge_core::{GeneratorError, Value, ValueGenerator};

/// Random version 4 UUID, the default client-side source for `uuid` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl ValueGenerator for UuidV4Generator {
    fn id(&self) -> &str {
        "builtin.uuid.v4"
    }

    fn next_value(&self) -> Result<Value, GeneratorError> {
        Ok(Value::Uuid(uuid::Uuid::new_v4().to_string()))
    }
}
