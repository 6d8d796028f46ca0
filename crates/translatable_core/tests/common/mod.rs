//! Shared fixtures: a host schema with a translatable `posts` model.

#![allow(dead_code)]

use rusqlite::Connection;
use translatable_core::db::open_db_in_memory;
use translatable_core::{FieldDescriptor, FieldKind, Locale, LocaleContext, TranslationSchema};

pub fn post_schema() -> TranslationSchema {
    TranslationSchema::new(
        "post",
        "posts",
        vec![
            FieldDescriptor {
                name: "title".to_string(),
                kind: FieldKind::Text,
            },
            FieldDescriptor {
                name: "body".to_string(),
                kind: FieldKind::Text,
            },
            FieldDescriptor {
                name: "author".to_string(),
                kind: FieldKind::Reference,
            },
        ],
    )
    .expect("post schema should validate")
}

/// Host-owned schema: the library itself never creates these tables.
pub fn open_host_db() -> Connection {
    let conn = open_db_in_memory().expect("in-memory db should open");
    conn.execute_batch(
        "CREATE TABLE posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT,
            category_id INTEGER
         );
         CREATE TABLE post_translations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            locale TEXT NOT NULL,
            title TEXT,
            body TEXT,
            author_id INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE (post_id, locale)
         );",
    )
    .expect("host schema should apply");
    conn
}

pub fn insert_post(conn: &Connection, slug: Option<&str>, category_id: Option<i64>) -> i64 {
    conn.execute(
        "INSERT INTO posts (slug, category_id) VALUES (?1, ?2);",
        rusqlite::params![slug, category_id],
    )
    .expect("post insert should succeed");
    conn.last_insert_rowid()
}

pub fn locale(tag: &str) -> Locale {
    Locale::new(tag).expect("valid locale tag")
}

pub fn ctx(active: &str, default: &str) -> LocaleContext {
    LocaleContext::new(locale(active), locale(default))
}
