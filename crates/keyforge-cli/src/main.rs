mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use keyforge_core::{ConfigurationError, Entity, EntitySchema, Value};
use keyforge_gateway::{InMemoryGateway, PersistenceError, PersistenceGateway};
use keyforge_generate::{GenerationError, GeneratorRegistry, InsertOrchestrator, Resolution};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use config::{KeyforgeConfig, config_json_schema};
use logging::init_logging;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "keyforge", version, about = "Primary-key generation for entity inserts")]
struct Cli {
    /// Append JSON logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register entities from the config and report how each generated column resolves.
    Check(CheckArgs),
    /// Insert JSON rows through the in-memory engine and print the stored entities.
    Insert(InsertArgs),
    /// Print the JSON Schema of the config file.
    ConfigSchema,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Path to keyforge.toml.
    #[arg(long, default_value = "keyforge.toml")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct InsertArgs {
    /// Path to keyforge.toml.
    #[arg(long, default_value = "keyforge.toml")]
    config: PathBuf,
    /// Entity type to insert.
    #[arg(long)]
    entity: String,
    /// JSON file holding an array of objects, one per entity.
    #[arg(long)]
    rows: PathBuf,
    /// Look every row up by primary key after the insert.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    verify: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Check(args) => run_check(args),
        Command::Insert(args) => run_insert(args).await,
        Command::ConfigSchema => {
            println!("{}", serde_json::to_string_pretty(&config_json_schema())?);
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<(KeyforgeConfig, GeneratorRegistry, Vec<EntitySchema>), CliError> {
    let config = KeyforgeConfig::load(path)?;
    let registry = config.registry();
    let schemas = config.schemas()?;
    for schema in &schemas {
        registry.validate(schema)?;
    }
    tracing::info!(event = "config_loaded", path = %path.display(), entities = schemas.len());
    Ok((config, registry, schemas))
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let (_, registry, schemas) = load(&args.config)?;

    let entities: Vec<_> = schemas
        .iter()
        .map(|schema| {
            let columns: Vec<_> = schema
                .generated_columns()
                .iter()
                .map(|column| {
                    let source = match (column.generator(), registry.resolve(column.strategy())) {
                        (Some(generator), _) => generator.id().to_string(),
                        (None, Some(Resolution::Client(generator))) => generator.id().to_string(),
                        (None, Some(Resolution::Database)) | (None, None) => "database".to_string(),
                    };
                    json!({
                        "column": column.name(),
                        "strategy": column.strategy(),
                        "primary": column.primary(),
                        "source": source,
                    })
                })
                .collect();
            json!({ "entity": schema.name(), "generated": columns })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json!({ "entities": entities }))?);
    Ok(())
}

async fn run_insert(args: InsertArgs) -> Result<(), CliError> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    tracing::info!(event = "run_started", run_id = %run_id, entity = %args.entity);

    let (config, registry, schemas) = load(&args.config)?;
    let schema = schemas
        .into_iter()
        .find(|schema| schema.name() == args.entity)
        .ok_or_else(|| {
            CliError::InvalidInput(format!("entity {} is not configured", args.entity))
        })?;

    let mut entities = read_entities(&args.rows, schema.name())?;
    let orchestrator = InsertOrchestrator::new(Arc::new(registry), config.insert_options());
    let gateway = InMemoryGateway::new();

    let report = orchestrator.insert(&gateway, &schema, &mut entities).await?;

    if args.verify {
        verify_round_trip(&gateway, &schema, &entities).await?;
        tracing::info!(event = "round_trip_verified", rows = entities.len());
    }

    let output = json!({
        "run_id": run_id,
        "started_at": started_at.to_rfc3339(),
        "report": report,
        "entities": entities.iter().map(Entity::to_json).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    tracing::info!(event = "run_finished", run_id = %run_id, status = "success");
    Ok(())
}

fn read_entities(path: &Path, entity: &str) -> Result<Vec<Entity>, CliError> {
    let content = std::fs::read_to_string(path)?;
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&content)?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            row.iter().try_fold(
                Entity::new(entity),
                |acc, (column, raw)| -> Result<Entity, CliError> {
                    let value = Value::from_json(raw).ok_or_else(|| {
                        CliError::InvalidInput(format!(
                            "row {index} column {column} must be a scalar"
                        ))
                    })?;
                    Ok(acc.with(column.clone(), value))
                },
            )
        })
        .collect()
}

async fn verify_round_trip(
    gateway: &dyn PersistenceGateway,
    schema: &EntitySchema,
    entities: &[Entity],
) -> Result<(), CliError> {
    let Some(primary) = schema.primary_key() else {
        return Ok(());
    };

    for (index, entity) in entities.iter().enumerate() {
        let key = entity.get(&primary.name).cloned().unwrap_or(Value::Null);
        let stored = gateway
            .find_one_by(schema.name(), &primary.name, &key)
            .await?
            .ok_or_else(|| CliError::InvalidInput(format!("row {index} not found by key {key}")))?;

        let mismatch = entity
            .fields()
            .find(|(column, value)| stored.get(column).is_none_or(|stored| !stored.key_eq(value)));
        if let Some((column, _)) = mismatch {
            return Err(CliError::InvalidInput(format!(
                "row {index} column {column} differs after round trip"
            )));
        }
    }
    Ok(())
}
