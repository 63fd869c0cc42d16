use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use keyforge_core::{ColumnSpec, Entity, EntitySchema, Strategy, Value};
use keyforge_gateway::{InMemoryGateway, PersistenceGateway};
use keyforge_generate::{
    CustomGenerator, DecisionSource, GenerationError, GeneratorRegistry, InsertOptions,
    InsertOrchestrator, ResolutionPolicy, SequentialUuidGenerator,
};

const EXPLICIT_ID: &str = "12345678-1234-4234-8234-123456789012";

fn orchestrator() -> InsertOrchestrator {
    InsertOrchestrator::new(Arc::new(GeneratorRegistry::new()), InsertOptions::default())
}

fn counter_schema(generator: Arc<SequentialUuidGenerator>) -> EntitySchema {
    EntitySchema::builder("post")
        .column(
            ColumnSpec::new("id")
                .primary()
                .strategy(Strategy::Uuid)
                .shared_generator(generator),
        )
        .column(ColumnSpec::new("title"))
        .build()
        .expect("schema builds")
}

fn plain_uuid_schema() -> EntitySchema {
    EntitySchema::builder("comment")
        .column(ColumnSpec::new("id").primary().strategy(Strategy::Uuid))
        .column(ColumnSpec::new("body"))
        .build()
        .expect("schema builds")
}

fn counting_schema(calls: Arc<AtomicUsize>) -> EntitySchema {
    let generator = CustomGenerator::from_fn("counting", move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        SequentialUuidGenerator::format(n as u64)
    });
    EntitySchema::builder("post")
        .column(ColumnSpec::new("id").primary().generated("uuid").generator(generator))
        .column(ColumnSpec::new("title"))
        .build()
        .expect("schema builds")
}

#[tokio::test]
async fn counter_generator_assigns_sequential_ids_and_skips_explicit() {
    let generator = Arc::new(SequentialUuidGenerator::default());
    let schema = counter_schema(Arc::clone(&generator));
    let orchestrator = orchestrator();
    let gateway = InMemoryGateway::new();

    let mut first = vec![Entity::new("post").with("title", "first")];
    orchestrator
        .insert(&gateway, &schema, &mut first)
        .await
        .expect("first insert");
    let mut second = vec![Entity::new("post").with("title", "second")];
    orchestrator
        .insert(&gateway, &schema, &mut second)
        .await
        .expect("second insert");

    assert_eq!(
        first[0].get("id"),
        Some(&Value::Uuid("00000000-0000-4000-8000-000000000001".to_string()))
    );
    assert_eq!(
        second[0].get("id"),
        Some(&Value::Uuid("00000000-0000-4000-8000-000000000002".to_string()))
    );

    let mut third = vec![
        Entity::new("post")
            .with("id", EXPLICIT_ID)
            .with("title", "third"),
    ];
    orchestrator
        .insert(&gateway, &schema, &mut third)
        .await
        .expect("third insert");

    assert_eq!(third[0].get("id"), Some(&Value::from(EXPLICIT_ID)));
    assert_eq!(generator.peek(), 3);

    let stored = gateway
        .find_one_by("post", "id", &Value::from(EXPLICIT_ID))
        .await
        .expect("lookup")
        .expect("explicit row stored");
    assert_eq!(stored.get("title"), Some(&Value::from("third")));
}

#[test]
fn absent_id_takes_generator_value_from_a_single_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls));
    let mut entities = vec![Entity::new("post").with("title", "hello")];

    let prepared = orchestrator()
        .prepare_insert(&schema, &mut entities)
        .expect("prepare");

    let expected = Value::Text("00000000-0000-4000-8000-000000000001".to_string());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(entities[0].get("id"), Some(&expected));
    assert_eq!(prepared.rows[0].get("id"), Some(&expected));
    assert_eq!(prepared.sources[0].get("id"), Some(&DecisionSource::Generator));
}

#[test]
fn explicit_value_never_invokes_generator() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls));
    let mut entities = vec![
        Entity::new("post")
            .with("id", EXPLICIT_ID)
            .with("title", "kept"),
    ];

    let prepared = orchestrator()
        .prepare_insert(&schema, &mut entities)
        .expect("prepare");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(entities[0].get("id"), Some(&Value::from(EXPLICIT_ID)));
    assert_eq!(prepared.rows[0].get("id"), Some(&Value::from(EXPLICIT_ID)));
    assert_eq!(prepared.sources[0].get("id"), Some(&DecisionSource::Explicit));
}

#[test]
fn explicit_null_and_undefined_generate_identically() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls));
    let registry = GeneratorRegistry::new();
    let policy = ResolutionPolicy::new(&registry);
    let column = schema.generated_column("id").expect("generated id");

    let undefined = policy.decide(column, None).expect("undefined decision");
    let null = policy.decide(column, Some(&Value::Null)).expect("null decision");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(undefined.source, DecisionSource::Generator);
    assert_eq!(null.source, DecisionSource::Generator);
    assert!(undefined.should_generate && null.should_generate);
    assert_eq!(
        undefined.value,
        Some(Value::Text("00000000-0000-4000-8000-000000000001".to_string()))
    );
    assert_eq!(
        null.value,
        Some(Value::Text("00000000-0000-4000-8000-000000000002".to_string()))
    );
}

#[test]
fn batch_follows_entity_order_from_current_counter_state() {
    let state = Arc::new(AtomicU64::new(41));
    let counter = Arc::clone(&state);
    let generator = CustomGenerator::from_fn("stateful", move || {
        SequentialUuidGenerator::format(counter.fetch_add(1, Ordering::SeqCst))
    });
    let schema = EntitySchema::builder("post")
        .column(ColumnSpec::new("id").primary().strategy(Strategy::Uuid).generator(generator))
        .column(ColumnSpec::new("title"))
        .build()
        .expect("schema builds");

    let mut entities: Vec<Entity> = (0..5)
        .map(|n| Entity::new("post").with("title", format!("post {n}")))
        .collect();
    entities[2].set("id", Value::Null);

    orchestrator()
        .prepare_insert(&schema, &mut entities)
        .expect("prepare");

    let ids: Vec<Value> = entities
        .iter()
        .map(|entity| entity.get("id").cloned().unwrap_or(Value::Null))
        .collect();
    let expected: Vec<Value> = (41..46)
        .map(|n| Value::Text(SequentialUuidGenerator::format(n)))
        .collect();
    assert_eq!(ids, expected);
    assert_eq!(state.load(Ordering::SeqCst), 46);
}

#[tokio::test]
async fn plain_uuid_column_gets_builtin_uuid_not_counter_format() {
    let generator = Arc::new(SequentialUuidGenerator::default());
    let posts = counter_schema(Arc::clone(&generator));
    let comments = plain_uuid_schema();
    let orchestrator = orchestrator();
    let gateway = InMemoryGateway::new();

    let mut post = vec![Entity::new("post").with("title", "counted")];
    orchestrator
        .insert(&gateway, &posts, &mut post)
        .await
        .expect("post insert");

    let mut comment = vec![Entity::new("comment").with("body", "hi")];
    orchestrator
        .insert(&gateway, &comments, &mut comment)
        .await
        .expect("comment insert");

    let id = comment[0]
        .get("id")
        .and_then(Value::as_str)
        .expect("comment id assigned")
        .to_string();
    assert!(!id.is_empty());
    assert!(!id.starts_with("00000000-0000-4000-8000-"));
    assert_eq!(generator.peek(), 2);
}

#[tokio::test]
async fn round_trip_preserves_non_key_fields() {
    let schema = plain_uuid_schema();
    let gateway = InMemoryGateway::new();
    let original = Entity::new("comment").with("body", "round trip");
    let mut entities = vec![original.clone()];

    orchestrator()
        .insert(&gateway, &schema, &mut entities)
        .await
        .expect("insert");

    let key = entities[0].get("id").cloned().expect("id assigned");
    let stored = gateway
        .find_one_by("comment", "id", &key)
        .await
        .expect("lookup")
        .expect("row stored");

    for (column, value) in original.fields() {
        assert_eq!(stored.get(column), Some(value));
    }
    assert_eq!(stored.get("id"), Some(&key));
}

#[tokio::test]
async fn generator_returning_null_fails_the_insert() {
    let generator = CustomGenerator::from_fn("nullable", || None::<String>);
    let schema = EntitySchema::builder("post")
        .column(ColumnSpec::new("id").primary().strategy(Strategy::Uuid).generator(generator))
        .column(ColumnSpec::new("title"))
        .build()
        .expect("schema builds");
    let gateway = InMemoryGateway::new();
    let mut entities = vec![Entity::new("post").with("title", "untitled")];

    let err = orchestrator()
        .insert(&gateway, &schema, &mut entities)
        .await
        .unwrap_err();

    match err {
        GenerationError::GeneratorInvocation {
            ref generator,
            ref source,
            ..
        } => {
            assert_eq!(generator, "nullable");
            assert_eq!(source.message(), "generator returned null");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(entities[0].get("id"), None);
    assert!(gateway.rows("post").expect("rows").is_empty());
}

#[test]
fn rejected_batch_consumes_no_generator_values() {
    let generator = Arc::new(SequentialUuidGenerator::default());
    let schema = counter_schema(Arc::clone(&generator));
    let orchestrator = orchestrator();

    let mut mixed = vec![
        Entity::new("post").with("title", "a"),
        Entity::new("post").with("title", "b"),
        Entity::new("comment").with("title", "c"),
    ];
    let err = orchestrator.prepare_insert(&schema, &mut mixed).unwrap_err();
    assert!(matches!(err, GenerationError::EntityMismatch { row: 2, .. }));
    assert_eq!(generator.peek(), 1);
    assert!(mixed.iter().all(|entity| entity.get("id").is_none()));

    let mut undeclared = vec![
        Entity::new("post").with("title", "a"),
        Entity::new("post").with("slug", "b"),
    ];
    let err = orchestrator
        .prepare_insert(&schema, &mut undeclared)
        .unwrap_err();
    assert!(matches!(err, GenerationError::UnknownColumn { row: 1, .. }));
    assert_eq!(generator.peek(), 1);
    assert_eq!(undeclared[0].get("id"), None);
}
