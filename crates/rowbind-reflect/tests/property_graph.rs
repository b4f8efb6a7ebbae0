//! End-to-end walks over mixed bean/map/sequence graphs, including graphs
//! deserialized from JSON fixtures.

use rowbind_reflect::{
    Bean, DeclaredType, DefaultObjectFactory, MetaValue, PropertyPath, ReflectError, TypeRegistry,
    TypeSchema, Value,
};

fn registry() -> std::sync::Arc<TypeRegistry> {
    std::sync::Arc::new(TypeRegistry::from_schemas([
        TypeSchema::new("User")
            .property("userName", DeclaredType::Str)
            .property("profile", DeclaredType::map_of(DeclaredType::Any))
            .property("orders", DeclaredType::list(DeclaredType::bean("Order"))),
        TypeSchema::new("Order")
            .property("id", DeclaredType::Long)
            .property("items", DeclaredType::list(DeclaredType::bean("Item"))),
        TypeSchema::new("Item").property("name", DeclaredType::Str),
    ]))
}

#[test]
fn deep_mixed_graph_round_trip() {
    let registry = registry();
    let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
    let meta = MetaValue::new(&registry, &factory);

    let item = Bean::new("Item").with("name", "pencil");
    let order = Bean::new("Order")
        .with("id", 41)
        .with("items", vec![Value::Bean(item)]);
    let mut user = Value::Bean(
        Bean::new("User")
            .with("userName", "grace")
            .with("orders", vec![Value::Bean(order)]),
    );

    assert_eq!(
        meta.get(&user, "orders[0].items[0].name").unwrap(),
        Value::Str("pencil".into())
    );

    meta.set(&mut user, "orders[0].items[0].name", Value::Str("pen".into()))
        .unwrap();
    assert_eq!(
        meta.get(&user, "orders[0].items[0].name").unwrap(),
        Value::Str("pen".into())
    );

    // Map-valued property: keys resolve directly, and writes create the
    // mapping on demand.
    meta.set(&mut user, "profile.theme", Value::Str("dark".into()))
        .unwrap();
    assert_eq!(
        meta.get(&user, "profile.theme").unwrap(),
        Value::Str("dark".into())
    );
    assert_eq!(meta.get(&user, "profile.missing").unwrap(), Value::Null);
}

#[test]
fn json_fixture_rows_are_walkable() {
    let registry = registry();
    let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
    let meta = MetaValue::new(&registry, &factory);

    // Rows coming back from an executor are plain mappings; the walker must
    // treat their keys directly, never through a descriptor.
    let row: Value = serde_json::from_value(serde_json::json!({
        "Map": {
            "id": { "Int": 7 },
            "tags": { "Seq": [ { "Str": "new" }, { "Str": "vip" } ] }
        }
    }))
    .expect("fixture decodes");

    assert_eq!(meta.get(&row, "id").unwrap(), Value::Int(7));
    assert_eq!(meta.get(&row, "tags[1]").unwrap(), Value::Str("vip".into()));
}

#[test]
fn descriptor_walks_match_value_walks() {
    let registry = registry();
    assert_eq!(
        registry
            .getter_type_at("User", "orders[0].items[0].name")
            .unwrap(),
        DeclaredType::Str
    );
    assert_eq!(
        registry.find_property_path("User", "ORDERS[0].ID", false),
        Some("orders.id".to_string())
    );
}

#[test]
fn segment_iteration_is_single_pass() {
    let path = PropertyPath::parse("a.b[2].c");
    let mut names = Vec::new();
    for segment in path.segments() {
        names.push((segment.name().to_string(), segment.index().map(str::to_string)));
    }
    assert_eq!(
        names,
        vec![
            ("a".to_string(), None),
            ("b".to_string(), Some("2".to_string())),
            ("c".to_string(), None)
        ]
    );
    // The parsed head is unchanged by iteration; re-walking requires
    // re-parsing the original expression.
    assert_eq!(path.name(), "a");
    assert!(matches!(
        path.remove(),
        ReflectError::UnsupportedOperation(_)
    ));
}
