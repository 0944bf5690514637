use super::*;
use crate::row::attributes;
use chrono::NaiveDate;
use fx_core::{identify_integer, Association, FixtureValue, ModelDescriptor};
use fx_db::DuckDbBackend;
use tempfile::TempDir;

const SCHEMA: &str = r#"
CREATE TABLE users (
    id INTEGER,
    name VARCHAR,
    type VARCHAR,
    manager_id INTEGER,
    created_at TIMESTAMP,
    updated_at TIMESTAMP
);
CREATE TABLE posts (
    id INTEGER,
    title VARCHAR NOT NULL,
    author_id INTEGER,
    published BOOLEAN DEFAULT false
);
CREATE TABLE audit_log (entry VARCHAR);
CREATE TABLE schema_migrations (version VARCHAR);
"#;

fn loaded_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn fixtures_dir(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("test/fixtures");
    for (name, content) in files {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    temp
}

fn models() -> ModelRegistry {
    let mut models = ModelRegistry::new();
    models.register(
        "users",
        ModelDescriptor::new("User", "users").with_association(Association::belongs_to("manager")),
    );
    models.register(
        "admins",
        ModelDescriptor::new("Admin", "users").with_association(Association::belongs_to("manager")),
    );
    models.register(
        "posts",
        ModelDescriptor::new("Post", "posts").with_association(Association::belongs_to("author")),
    );
    models
}

fn fixture_set(temp: &TempDir) -> FixtureSet {
    let options = FixtureOptions::new(vec![temp.path().join("test/fixtures")]);
    FixtureSet::new(options, models()).with_loaded_at(loaded_at())
}

const USERS: &str = "alice:\n  name: Alice\nbob:\n  name: Bob\n  manager: alice\n";

#[tokio::test]
async fn test_apply_users_scenario() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    assert_eq!(set.state(), FixtureSetState::Applied);

    let alice = identify_integer("alice");
    let bob = identify_integer("bob");
    assert_eq!(
        db.query_count(&format!(
            "SELECT * FROM users WHERE id = {alice} AND manager_id IS NULL"
        ))
        .await
        .unwrap(),
        1
    );
    assert_eq!(
        db.query_count(&format!(
            "SELECT * FROM users WHERE id = {bob} AND manager_id = {alice}"
        ))
        .await
        .unwrap(),
        1
    );
    assert_eq!(
        db.query_count("SELECT * FROM users WHERE created_at = TIMESTAMP '2024-01-01 12:00:00'")
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_lookup() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    assert!(matches!(
        set.lookup("users", "alice"),
        Err(FixtureError::NotBaked { .. })
    ));

    set.build(&db).await.unwrap();
    assert_eq!(set.state(), FixtureSetState::Baked);
    assert_eq!(
        set.lookup("users", "alice").unwrap(),
        &Identifier::Integer(identify_integer("alice"))
    );

    let err = set.lookup("users", "mallory").unwrap_err();
    assert_eq!(
        err.to_string(),
        "[X001] No fixture named 'mallory' found for fixture set 'users'"
    );
    assert!(matches!(
        set.lookup("widgets", "alice"),
        Err(FixtureError::UnknownFixture { .. })
    ));
}

#[tokio::test]
async fn test_statement_shape() {
    let temp = fixtures_dir(&[("users.yml", USERS), ("posts.yml", "")]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);
    set.build(&db).await.unwrap();

    let posts = set.table("posts").unwrap();
    assert_eq!(posts.statements, vec!["DELETE FROM \"posts\"".to_string()]);

    let users = set.table("users").unwrap();
    assert_eq!(users.statements.len(), 2);
    assert_eq!(users.statements[1].matches("),\n(").count() + 1, 2);

    // Grouped by table name
    let statements = set.statements().unwrap();
    assert_eq!(statements[0], "DELETE FROM \"posts\"");
    assert_eq!(statements[1], "DELETE FROM \"users\"");
}

#[tokio::test]
async fn test_definitions_sharing_a_table_compile_together() {
    let temp = fixtures_dir(&[
        ("users.yml", USERS),
        ("admins.yml", "root:\n  name: Root\n  type: Admin\n"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    let users = set.table("users").unwrap();
    assert_eq!(users.row_count(), 3);
    assert_eq!(users.statements.len(), 2);
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 3);
    assert!(set.lookup("admins", "root").is_ok());
}

#[tokio::test]
async fn test_missing_model_degrades_to_columns() {
    let temp = fixtures_dir(&[("audit_log.yml", "first:\n  entry: hello $LABEL\n")]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    assert!(set.definition("audit_log").unwrap().model().is_none());
    assert_eq!(
        db.query_count("SELECT * FROM audit_log WHERE entry = 'hello first'")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_add_fixture_lifecycle() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    assert!(matches!(
        set.add_fixture("users", "carol", Attributes::new()),
        Err(FixtureError::InvalidState { .. })
    ));

    set.load(&db).await.unwrap();
    let carol = set
        .add_fixture("users", "carol", attributes([("manager", "bob".into())]))
        .unwrap();
    assert_eq!(
        carol.get("manager_id"),
        Some(&FixtureValue::Integer(identify_integer("bob")))
    );
    assert!(matches!(
        set.add_fixture("widgets", "w1", Attributes::new()),
        Err(FixtureError::UnknownFixture { .. })
    ));

    set.bake(&db).unwrap();
    let err = set
        .add_fixture("users", "dave", Attributes::new())
        .unwrap_err();
    assert!(matches!(err, FixtureError::AlreadyBaked { .. }));

    set.apply(&db).await.unwrap();
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 3);
    assert!(set.lookup("users", "carol").is_ok());
}

#[tokio::test]
async fn test_load_twice_is_rejected() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.load(&db).await.unwrap();
    assert!(matches!(
        set.load(&db).await,
        Err(FixtureError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn test_bake_before_load_is_rejected() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    let mut set = fixture_set(&temp);
    assert!(matches!(
        set.bake(&db),
        Err(FixtureError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn test_format_error_produces_no_statements() {
    let temp = fixtures_dir(&[("users.yml", "alice:\n  nickname: Al\n")]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    let err = set.build(&db).await.unwrap_err();
    assert!(err.is_format_error());
    assert_eq!(set.state(), FixtureSetState::Loaded);
    assert!(set.table("users").is_none());
    assert!(set.statements().is_err());
}

#[tokio::test]
async fn test_apply_statements_roll_back_with_outer_transaction() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    db.execute("INSERT INTO users (id, name) VALUES (1, 'existing')")
        .await
        .unwrap();
    let mut set = fixture_set(&temp);
    set.build(&db).await.unwrap();

    db.begin_transaction().await.unwrap();
    let executed = set.apply_statements(&db).await.unwrap();
    assert_eq!(executed, 2);
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 2);
    db.rollback().await.unwrap();

    assert_eq!(
        db.query_count("SELECT * FROM users WHERE name = 'existing'")
            .await
            .unwrap(),
        1
    );
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_apply_rolls_back() {
    let temp = fixtures_dir(&[
        ("users.yml", USERS),
        ("posts.yml", "first:\n  title: Hello\nsecond:\n  author: alice\n"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    db.execute("INSERT INTO posts (id, title) VALUES (1, 'kept')")
        .await
        .unwrap();
    let mut set = fixture_set(&temp);

    // `second` has no title, which violates NOT NULL
    let err = set.apply(&db).await.unwrap_err();
    assert!(matches!(err, FixtureError::Db(_)));
    assert_eq!(set.state(), FixtureSetState::Baked);
    assert_eq!(
        db.query_count("SELECT * FROM posts WHERE title = 'kept'")
            .await
            .unwrap(),
        1
    );
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 0);
}

#[tokio::test]
async fn test_column_defaults_fill_missing_values() {
    let temp = fixtures_dir(&[(
        "posts.yml",
        "first:\n  title: Hello\n  published: true\nsecond:\n  title: Draft\n",
    )]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    assert_eq!(
        db.query_count("SELECT * FROM posts WHERE title = 'Draft' AND NOT published")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_clear_other_tables() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    db.execute_batch(
        "INSERT INTO audit_log VALUES ('stale');\
         INSERT INTO schema_migrations VALUES ('20240101');",
    )
    .await
    .unwrap();

    let mut options = FixtureOptions::new(vec![temp.path().join("test/fixtures")]);
    options.clear_other_tables = true;
    let mut set = FixtureSet::new(options, models()).with_loaded_at(loaded_at());

    set.apply(&db).await.unwrap();
    assert_eq!(db.query_count("SELECT * FROM audit_log").await.unwrap(), 0);
    assert_eq!(
        db.query_count("SELECT * FROM schema_migrations")
            .await
            .unwrap(),
        1
    );
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 2);
}

#[tokio::test]
async fn test_other_tables_kept_by_default() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    db.execute("INSERT INTO audit_log VALUES ('kept')")
        .await
        .unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    assert_eq!(db.query_count("SELECT * FROM audit_log").await.unwrap(), 1);
}

#[tokio::test]
async fn test_ensure_applied() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    assert!(set.ensure_applied(&db, true).await.unwrap());
    assert!(!set.ensure_applied(&db, true).await.unwrap());

    // A non-transactional test always applies and dirties the next one
    assert!(set.ensure_applied(&db, false).await.unwrap());
    assert!(set.ensure_applied(&db, true).await.unwrap());
    assert!(!set.ensure_applied(&db, true).await.unwrap());
}

#[tokio::test]
async fn test_first_search_path_wins() {
    let first = fixtures_dir(&[("users.yml", "alice:\n  name: First\n")]);
    let second = fixtures_dir(&[
        ("users.yml", "alice:\n  name: Second\n"),
        ("posts.yml", "hello:\n  title: Hi\n"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();

    let options = FixtureOptions::new(vec![
        first.path().join("test/fixtures"),
        second.path().join("test/fixtures"),
    ]);
    let mut set = FixtureSet::new(options, models()).with_loaded_at(loaded_at());
    set.apply(&db).await.unwrap();

    assert_eq!(
        db.query_count("SELECT * FROM users WHERE name = 'First'")
            .await
            .unwrap(),
        1
    );
    assert_eq!(db.query_count("SELECT * FROM posts").await.unwrap(), 1);
}

#[tokio::test]
async fn test_templates_see_loaded_at() {
    let temp = fixtures_dir(&[(
        "users.yml",
        "alice:\n  name: \"{{ fixture_name }} at {{ loaded_at }}\"\n",
    )]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    assert_eq!(
        db.query_count("SELECT * FROM users WHERE name = 'users at 2024-01-01 12:00:00'")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_trace_has_no_functional_effect() {
    let temp = fixtures_dir(&[("users.yml", USERS)]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let mut options = FixtureOptions::new(vec![temp.path().join("test/fixtures")]);
    options.trace = true;
    let mut set = FixtureSet::new(options, models()).with_loaded_at(loaded_at());

    set.apply(&db).await.unwrap();
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 2);
}

const REFERENCING_SCHEMA: &str = r#"
CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR);
CREATE TABLE posts (
    id INTEGER PRIMARY KEY,
    title VARCHAR,
    author_id INTEGER REFERENCES users(id)
);
"#;

#[tokio::test]
async fn test_apply_writes_referenced_tables_first() {
    let temp = fixtures_dir(&[
        ("users.yml", "alice:\n  name: Alice\n"),
        ("posts.yml", "hello:\n  title: Hello\n  author: alice\n"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(REFERENCING_SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);

    set.apply(&db).await.unwrap();
    assert_eq!(
        db.query_count(
            "SELECT * FROM posts p JOIN users u ON p.author_id = u.id WHERE u.name = 'Alice'"
        )
        .await
        .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_apply_statements_follow_foreign_keys() {
    let temp = fixtures_dir(&[
        ("users.yml", "alice:\n  name: Alice\n"),
        ("posts.yml", "hello:\n  title: Hello\n  author: alice\n"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(REFERENCING_SCHEMA).await.unwrap();
    let mut set = fixture_set(&temp);
    set.build(&db).await.unwrap();

    db.begin_transaction().await.unwrap();
    let executed = set.apply_statements(&db).await.unwrap();
    db.commit().await.unwrap();

    assert_eq!(executed, 4);
    assert_eq!(db.query_count("SELECT * FROM posts").await.unwrap(), 1);
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 1);
}
