mod common;

use common::{ctx, insert_post, open_host_db, post_schema};
use translatable_core::db::{open_db, open_db_in_memory};
use translatable_core::{
    FieldDescriptor, FieldKind, FieldValue, RepoError, SqliteTranslationRepository,
    TranslationSchema, TranslationService,
};

#[test]
fn binding_fails_without_the_translation_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE posts (id INTEGER PRIMARY KEY);")
        .unwrap();

    let result = SqliteTranslationRepository::try_new(&conn, post_schema());
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable(table)) if table == "post_translations"
    ));
}

#[test]
fn binding_fails_when_a_declared_column_is_absent() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE posts (id INTEGER PRIMARY KEY);
         CREATE TABLE post_translations (
            id INTEGER PRIMARY KEY,
            post_id INTEGER NOT NULL,
            locale TEXT NOT NULL,
            title TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
         );",
    )
    .unwrap();

    let result = SqliteTranslationRepository::try_new(&conn, post_schema());
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn { column, .. }) if column == "body"
    ));
}

#[test]
fn binding_rejects_invalid_descriptors() {
    let conn = open_host_db();
    let schema = TranslationSchema {
        model: "post".to_string(),
        base_table: "posts".to_string(),
        fields: vec![FieldDescriptor {
            name: "locale".to_string(),
            kind: FieldKind::Text,
        }],
    };
    assert!(matches!(
        SqliteTranslationRepository::try_new(&conn, schema),
        Err(RepoError::Schema(_))
    ));
}

#[test]
fn destroying_a_post_cascades_to_its_translation_rows() {
    let conn = open_host_db();
    let repo = SqliteTranslationRepository::try_new(&conn, post_schema()).unwrap();
    let service = TranslationService::new(repo);

    let post_id = insert_post(&conn, None, None);
    let mut record = service.attach(post_id).unwrap();
    service.stage(&mut record, "title", "English title").unwrap();
    service.flush(&mut record, &ctx("en", "en")).unwrap();
    service.stage(&mut record, "title", "Svensk titel").unwrap();
    service.flush(&mut record, &ctx("sv", "en")).unwrap();

    conn.execute("DELETE FROM posts WHERE id = ?1;", [post_id])
        .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM post_translations;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn delete_translations_removes_only_the_records_rows() {
    let conn = open_host_db();
    let repo = SqliteTranslationRepository::try_new(&conn, post_schema()).unwrap();
    let service = TranslationService::new(repo);

    let first = insert_post(&conn, None, None);
    let second = insert_post(&conn, None, None);
    for post_id in [first, second] {
        let mut record = service.attach(post_id).unwrap();
        service.stage(&mut record, "title", "title").unwrap();
        service.flush(&mut record, &ctx("en", "en")).unwrap();
    }

    assert_eq!(service.delete_translations(first).unwrap(), 1);
    let remaining = service.attach(second).unwrap();
    assert_eq!(remaining.rows().len(), 1);
}

#[test]
fn file_backed_databases_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE posts (id INTEGER PRIMARY KEY AUTOINCREMENT, slug TEXT, category_id INTEGER);
             CREATE TABLE post_translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                locale TEXT NOT NULL,
                title TEXT,
                body TEXT,
                author_id INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
             );",
        )
        .unwrap();

        let repo = SqliteTranslationRepository::try_new(&conn, post_schema()).unwrap();
        let service = TranslationService::new(repo);
        let post_id = insert_post(&conn, None, None);
        let mut record = service.attach(post_id).unwrap();
        service.stage(&mut record, "title", "persisted").unwrap();
        service.flush(&mut record, &ctx("en", "en")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteTranslationRepository::try_new(&conn, post_schema()).unwrap();
    let service = TranslationService::new(repo);
    let record = service.attach(1).unwrap();
    assert_eq!(
        service.read(&record, "title", &ctx("en", "en")).unwrap(),
        Some(&FieldValue::Text("persisted".to_string()))
    );
}
