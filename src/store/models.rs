// Row types for the users and articles tables

use rusqlite::Row;

/// A registered author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    /// PHC-formatted Argon2id hash, never the plaintext
    pub password_hash: String,
    pub register_date: String,
}

/// Insert payload for the `users` table
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// A published article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// Username of the author, not the user id
    pub author: String,
    pub body: String,
    pub create_date: String,
}

impl User {
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            username: row.get("username")?,
            password_hash: row.get("password")?,
            register_date: row.get("register_date")?,
        })
    }
}

impl Article {
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            body: row.get("body")?,
            create_date: row.get("create_date")?,
        })
    }
}
