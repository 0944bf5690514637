use super::*;
use crate::row::attributes;
use chrono::NaiveDate;
use fx_core::{identify_integer, identify_uuid, Association, ColumnInfo, ModelRegistry};

fn loaded_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn users_columns() -> ColumnCatalog {
    [
        ColumnInfo::new("id", "INTEGER"),
        ColumnInfo::new("name", "VARCHAR"),
        ColumnInfo::new("status", "INTEGER"),
        ColumnInfo::new("type", "VARCHAR"),
        ColumnInfo::new("manager_id", "INTEGER"),
        ColumnInfo::new("owner_id", "INTEGER"),
        ColumnInfo::new("owner_type", "VARCHAR"),
        ColumnInfo::new("created_at", "TIMESTAMP"),
        ColumnInfo::new("updated_at", "TIMESTAMP"),
    ]
    .into_iter()
    .collect()
}

fn users_model() -> ModelDescriptor {
    ModelDescriptor::new("User", "users")
        .with_association(Association::belongs_to("manager"))
        .with_association(Association {
            polymorphic: true,
            ..Association::belongs_to("owner")
        })
        .with_enum(
            "status",
            [
                ("active", FixtureValue::Integer(0)),
                ("archived", FixtureValue::Integer(1)),
            ],
        )
}

fn embellish_with(
    model: Option<&ModelDescriptor>,
    columns: &ColumnCatalog,
    models: &ModelRegistry,
    label: &str,
    attrs: Attributes,
) -> FixtureResult<Attributes> {
    Embellisher {
        table_name: "users",
        model,
        columns,
        models,
        loaded_at: loaded_at(),
    }
    .embellish(label, attrs)
}

#[test]
fn test_primary_key_from_label() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(Some(&model), &columns, &models, "alice", Attributes::new()).unwrap();
    assert_eq!(row.get("id"), Some(&FixtureValue::Integer(663665735)));
    assert_eq!(row.get_index(0).map(|(k, _)| k.as_str()), Some("id"));
}

#[test]
fn test_explicit_primary_key_kept() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "alice",
        attributes([("id", 7_i64.into())]),
    )
    .unwrap();
    assert_eq!(row.get("id"), Some(&FixtureValue::Integer(7)));
}

#[test]
fn test_uuid_primary_key() {
    let model = ModelDescriptor::new("Token", "tokens");
    let columns: ColumnCatalog = [ColumnInfo::new("id", "UUID")].into_iter().collect();
    let models = ModelRegistry::new();

    let row = embellish_with(Some(&model), &columns, &models, "alice", Attributes::new()).unwrap();
    assert_eq!(row.get("id"), Some(&FixtureValue::Uuid(identify_uuid("alice"))));
}

#[test]
fn test_no_model_uses_conventional_key_columns() {
    let columns: ColumnCatalog = [
        ColumnInfo::new("uuid", "UUID"),
        ColumnInfo::new("name", "VARCHAR"),
        ColumnInfo::new("created_at", "TIMESTAMP"),
    ]
    .into_iter()
    .collect();
    let models = ModelRegistry::new();

    let row = embellish_with(
        None,
        &columns,
        &models,
        "bob",
        attributes([("name", "Bob".into())]),
    )
    .unwrap();
    assert_eq!(row.get("uuid"), Some(&FixtureValue::Uuid(identify_uuid("bob"))));
    // No model means no timestamp tracking
    assert!(row.get("created_at").is_none());
}

#[test]
fn test_label_substitution() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "carol",
        attributes([("name", "$LABEL the $LABEL".into())]),
    )
    .unwrap();
    assert_eq!(row.get("name"), Some(&FixtureValue::from("carol the carol")));
}

#[test]
fn test_timestamps_use_loaded_at() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(Some(&model), &columns, &models, "alice", Attributes::new()).unwrap();
    assert_eq!(row.get("created_at"), Some(&FixtureValue::DateTime(loaded_at())));
    assert_eq!(row.get("updated_at"), Some(&FixtureValue::DateTime(loaded_at())));
}

#[test]
fn test_timestamps_respect_explicit_values_and_date_columns() {
    let model = ModelDescriptor::new("Event", "events");
    let columns: ColumnCatalog = [
        ColumnInfo::new("id", "INTEGER"),
        ColumnInfo::new("created_at", "DATE"),
        ColumnInfo::new("updated_at", "TIMESTAMP"),
        ColumnInfo::new("created_on", "DATE"),
    ]
    .into_iter()
    .collect();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "launch",
        attributes([("updated_at", FixtureValue::Raw("now()".to_string()))]),
    )
    .unwrap();
    let date = loaded_at().date();
    assert_eq!(row.get("created_at"), Some(&FixtureValue::Date(date)));
    assert_eq!(
        row.get("updated_at"),
        Some(&FixtureValue::Raw("now()".to_string()))
    );
    assert_eq!(row.get("created_on"), Some(&FixtureValue::Date(date)));
    assert!(row.get("updated_on").is_none());
}

#[test]
fn test_timestamps_disabled() {
    let mut model = users_model();
    model.record_timestamps = false;
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(Some(&model), &columns, &models, "alice", Attributes::new()).unwrap();
    assert!(row.get("created_at").is_none());
}

#[test]
fn test_enum_translation() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let known = embellish_with(
        Some(&model),
        &columns,
        &models,
        "alice",
        attributes([("status", "archived".into())]),
    )
    .unwrap();
    assert_eq!(known.get("status"), Some(&FixtureValue::Integer(1)));

    let unknown = embellish_with(
        Some(&model),
        &columns,
        &models,
        "bob",
        attributes([("status", "suspended".into())]),
    )
    .unwrap();
    assert_eq!(unknown.get("status"), Some(&FixtureValue::from("suspended")));
}

#[test]
fn test_belongs_to_resolution() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "bob",
        attributes([("name", "Bob".into()), ("manager", "alice".into())]),
    )
    .unwrap();
    assert!(row.get("manager").is_none());
    assert_eq!(
        row.get("manager_id"),
        Some(&FixtureValue::Integer(identify_integer("alice")))
    );
}

#[test]
fn test_null_association_clears_foreign_key() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "alice",
        attributes([("manager", FixtureValue::Null)]),
    )
    .unwrap();
    assert_eq!(row.get("manager_id"), Some(&FixtureValue::Null));
}

#[test]
fn test_polymorphic_label_parsing() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "doc",
        attributes([("owner", "alice (Admin)".into())]),
    )
    .unwrap();
    assert_eq!(
        row.get("owner_id"),
        Some(&FixtureValue::Integer(identify_integer("alice")))
    );
    assert_eq!(row.get("owner_type"), Some(&FixtureValue::from("Admin")));
    assert!(row.get("owner").is_none());
}

#[test]
fn test_polymorphic_without_type_suffix() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "doc",
        attributes([("owner", "alice".into())]),
    )
    .unwrap();
    assert_eq!(
        row.get("owner_id"),
        Some(&FixtureValue::Integer(identify_integer("alice")))
    );
    assert!(row.get("owner_type").is_none());
}

#[test]
fn test_polymorphic_empty_type_suffix_writes_empty_type() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "doc",
        attributes([("owner", "alice ()".into())]),
    )
    .unwrap();
    assert_eq!(
        row.get("owner_id"),
        Some(&FixtureValue::Integer(identify_integer("alice")))
    );
    assert_eq!(row.get("owner_type"), Some(&FixtureValue::from("")));
}

#[test]
fn test_uuid_foreign_key() {
    let model = ModelDescriptor::new("Post", "posts").with_association(Association::belongs_to("author"));
    let columns: ColumnCatalog = [
        ColumnInfo::new("id", "UUID"),
        ColumnInfo::new("author_id", "UUID"),
    ]
    .into_iter()
    .collect();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "first",
        attributes([("author", "alice".into())]),
    )
    .unwrap();
    assert_eq!(
        row.get("author_id"),
        Some(&FixtureValue::Uuid(identify_uuid("alice")))
    );
}

#[test]
fn test_explicit_foreign_key_column() {
    let model = ModelDescriptor::new("User", "users").with_association(Association {
        foreign_key: Some("owner_id".to_string()),
        ..Association::belongs_to("boss")
    });
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "bob",
        attributes([("boss", "alice".into())]),
    )
    .unwrap();
    assert_eq!(
        row.get("owner_id"),
        Some(&FixtureValue::Integer(identify_integer("alice")))
    );
}

#[test]
fn test_missing_column_error() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let err = embellish_with(
        Some(&model),
        &columns,
        &models,
        "bob",
        attributes([("nickname", "Bobby".into())]),
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(err.is_format_error());
    assert!(message.contains("nickname"));
    assert!(message.contains("users"));
    assert!(message.contains("bob"));
}

#[test]
fn test_unsupported_association_kind() {
    let model = users_model().with_association(Association {
        kind: AssociationKind::HasMany,
        ..Association::belongs_to("reports")
    });
    let columns = users_columns();
    let models = ModelRegistry::new();

    let err = embellish_with(
        Some(&model),
        &columns,
        &models,
        "alice",
        attributes([("reports", "bob".into())]),
    )
    .unwrap_err();
    assert!(err
        .to_string()
        .contains("has type has_many, which is not currently supported"));
}

#[test]
fn test_inheritance_subtype_associations() {
    let base = ModelDescriptor::new("User", "users");
    let admin = ModelDescriptor::new("Admin", "users").with_association(Association::belongs_to("manager"));
    let mut models = ModelRegistry::new();
    models.register("users", base.clone());
    models.register("admins", admin);
    let columns = users_columns();

    let row = embellish_with(
        Some(&base),
        &columns,
        &models,
        "root",
        attributes([("type", "Admin".into()), ("manager", "alice".into())]),
    )
    .unwrap();
    assert_eq!(
        row.get("manager_id"),
        Some(&FixtureValue::Integer(identify_integer("alice")))
    );

    // Base model has no such association
    let err = embellish_with(
        Some(&base),
        &columns,
        &models,
        "plain",
        attributes([("manager", "alice".into())]),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        crate::error::FixtureError::Format(FormatError::MissingColumn { .. })
    ));
}

#[test]
fn test_unknown_subtype_falls_back_to_base() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let row = embellish_with(
        Some(&model),
        &columns,
        &models,
        "ghost",
        attributes([("type", "Ghost".into()), ("manager", "alice".into())]),
    )
    .unwrap();
    assert!(row.contains_key("manager_id"));
}

#[test]
fn test_association_outcome_is_order_independent() {
    let model = users_model();
    let columns = users_columns();
    let models = ModelRegistry::new();

    let forward = embellish_with(
        Some(&model),
        &columns,
        &models,
        "bob",
        attributes([
            ("manager", "alice".into()),
            ("owner", "carol (Admin)".into()),
            ("status", "active".into()),
        ]),
    )
    .unwrap();
    let backward = embellish_with(
        Some(&model),
        &columns,
        &models,
        "bob",
        attributes([
            ("status", "active".into()),
            ("owner", "carol (Admin)".into()),
            ("manager", "alice".into()),
        ]),
    )
    .unwrap();

    for column in ["id", "manager_id", "owner_id", "owner_type", "status"] {
        assert_eq!(forward.get(column), backward.get(column), "column {column}");
    }
    assert_eq!(forward.len(), backward.len());
}
