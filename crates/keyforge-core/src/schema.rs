use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::generator::ValueGenerator;
use crate::types::Strategy;
use crate::validation::validate_columns;

/// Declared column of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub nullable: bool,
    pub primary: bool,
}

/// Immutable metadata for a column whose value is synthesized on insert.
#[derive(Clone)]
pub struct GeneratedColumn {
    entity: String,
    name: String,
    strategy: Strategy,
    generator: Option<Arc<dyn ValueGenerator>>,
    nullable: bool,
    primary: bool,
}

impl GeneratedColumn {
    /// Entity type that owns the column.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Caller-supplied generator overriding the strategy's default source.
    pub fn generator(&self) -> Option<&Arc<dyn ValueGenerator>> {
        self.generator.as_ref()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn primary(&self) -> bool {
        self.primary
    }
}

impl fmt::Debug for GeneratedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedColumn")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("generator", &self.generator.as_ref().map(|g| g.id().to_string()))
            .field("nullable", &self.nullable)
            .field("primary", &self.primary)
            .finish()
    }
}

/// Registered shape of one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    columns: Vec<Column>,
    generated: Vec<GeneratedColumn>,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Generated columns in declaration order.
    pub fn generated_columns(&self) -> &[GeneratedColumn] {
        &self.generated
    }

    pub fn generated_column(&self, name: &str) -> Option<&GeneratedColumn> {
        self.generated.iter().find(|column| column.name == name)
    }

    /// First column flagged as primary.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.primary)
    }
}

/// Declaration of one column, consumed by [`EntitySchemaBuilder`].
#[derive(Clone)]
pub struct ColumnSpec {
    pub(crate) name: String,
    pub(crate) nullable: bool,
    pub(crate) primary: bool,
    pub(crate) strategy: Option<String>,
    pub(crate) generator: Option<Arc<dyn ValueGenerator>>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            primary: false,
            strategy: None,
            generator: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the column as generated using a strategy tag.
    ///
    /// The tag is parsed when the schema is built, so unknown tags fail
    /// registration rather than the first insert.
    pub fn generated(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn strategy(self, strategy: Strategy) -> Self {
        self.generated(strategy.as_str())
    }

    pub fn generator(self, generator: impl ValueGenerator + 'static) -> Self {
        self.shared_generator(Arc::new(generator))
    }

    /// Attach a generator that may also be referenced elsewhere.
    pub fn shared_generator(mut self, generator: Arc<dyn ValueGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("nullable", &self.nullable)
            .field("primary", &self.primary)
            .field("strategy", &self.strategy)
            .field("generator", &self.generator.as_ref().map(|g| g.id().to_string()))
            .finish()
    }
}

/// Explicit registration step for an entity type.
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    name: String,
    columns: Vec<ColumnSpec>,
}

impl EntitySchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    pub fn build(self) -> Result<EntitySchema> {
        let strategies = validate_columns(&self.name, &self.columns)?;

        let mut columns = Vec::with_capacity(self.columns.len());
        let mut generated = Vec::new();
        for (spec, strategy) in self.columns.into_iter().zip(strategies) {
            columns.push(Column {
                name: spec.name.clone(),
                nullable: spec.nullable,
                primary: spec.primary,
            });
            if let Some(strategy) = strategy {
                generated.push(GeneratedColumn {
                    entity: self.name.clone(),
                    name: spec.name,
                    strategy,
                    generator: spec.generator,
                    nullable: spec.nullable,
                    primary: spec.primary,
                });
            }
        }

        Ok(EntitySchema {
            name: self.name,
            columns,
            generated,
        })
    }
}
