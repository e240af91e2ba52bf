//! Relational store module
//!
//! SQLite-backed persistence for the `users` and `articles` tables.
//! Every operation is a single parameterized statement; the connection guard
//! is held only for the duration of that statement.

mod models;

pub use models::{Article, NewUser, User};

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    register_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    create_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_articles_author ON articles(author);
";

const ARTICLE_COLUMNS: &str = "id, title, author, body, create_date";

/// Store-layer failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the write
    #[error("duplicate value: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// SQLite-backed article and user store
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ── Articles ────────────────────────────────────────────────────

    pub fn all_articles(&self) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id"
        ))?;
        let articles = stmt
            .query_map([], Article::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    pub fn articles_by_author(&self, author: &str) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE author = ?1 ORDER BY id"
        ))?;
        let articles = stmt
            .query_map(params![author], Article::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    pub fn find_article(&self, id: i64) -> Result<Option<Article>, StoreError> {
        let conn = self.conn.lock();
        let article = conn
            .query_row(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
                params![id],
                Article::from_row,
            )
            .optional()?;
        Ok(article)
    }

    /// Insert an article. Returns the generated id.
    pub fn insert_article(&self, title: &str, body: &str, author: &str) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO articles (title, body, author) VALUES (?1, ?2, ?3)",
            params![title, body, author],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace title and body. Returns the number of rows touched.
    pub fn update_article(&self, id: i64, title: &str, body: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        Ok(conn.execute(
            "UPDATE articles SET title = ?1, body = ?2 WHERE id = ?3",
            params![title, body, id],
        )?)
    }

    /// Delete by id. Deleting a missing id is not an error.
    pub fn delete_article(&self, id: i64) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        Ok(conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?)
    }

    /// Run raw SQL against the connection, for breaking the schema in tests
    #[cfg(test)]
    pub fn execute_raw(&self, sql: &str) -> Result<(), StoreError> {
        Ok(self.conn.lock().execute_batch(sql)?)
    }

    // ── Users ───────────────────────────────────────────────────────

    /// Insert a user. Returns the generated id.
    pub fn insert_user(&self, user: &NewUser<'_>) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO users (name, email, username, password) VALUES (?1, ?2, ?3, ?4)",
            params![user.name, user.email, user.username, user.password_hash],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(user.username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, name, email, username, password, register_date
                 FROM users WHERE username = ?1",
                params![username],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }
}
