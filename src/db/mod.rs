use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Pool, Sqlite};

pub type Db = Pool<Sqlite>;

// User model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub email_verified: bool,
    pub password_hash: String,
    pub created_at: String,
    pub failed_attempts: i32,
    pub locked_until: Option<String>,
}

pub async fn create_pool(url: &str) -> Db {
    let options = sqlx::sqlite::SqliteConnectOptions::from_str(url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(options)
        .await
        .expect("Failed to connect to database")
}

// Run migrations (create tables if not exist)
pub async fn run_migrations(db: &Db) {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            username TEXT UNIQUE NOT NULL,
            email_verified INTEGER DEFAULT 0,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            failed_attempts INTEGER DEFAULT 0,
            locked_until TEXT
        )
        "#,
    )
    .execute(db)
    .await
    .expect("Failed to create users table");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tokens (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            hash TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await
    .expect("Failed to create tokens table");
}

// User queries
pub async fn get_user_by_email(db: &Db, email: &str) -> Option<User> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email.to_lowercase())
        .fetch_optional(db)
        .await
        .ok()
        .flatten()
}

pub async fn get_user_by_username(db: &Db, username: &str) -> Option<User> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await
        .ok()
        .flatten()
}

pub async fn get_user_by_id(db: &Db, id: &str) -> Option<User> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
        .ok()
        .flatten()
}

pub async fn create_user(
    db: &Db,
    id: &str,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, username, password_hash, created_at) VALUES (?, ?, ?, ?, datetime('now'))",
    )
    .bind(id)
    .bind(email.to_lowercase())
    .bind(username)
    .bind(password_hash)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn verify_user_email(db: &Db, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET email_verified = 1 WHERE id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_failed_attempts(
    db: &Db,
    user_id: &str,
    count: i32,
    locked_until: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET failed_attempts = ?, locked_until = ? WHERE id = ?")
        .bind(count)
        .bind(locked_until)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

// Token queries
pub async fn create_token(
    db: &Db,
    id: &str,
    user_id: &str,
    kind: &str,
    hash: &str,
    expires_at: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tokens (id, user_id, kind, hash, expires_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id)
        .bind(user_id)
        .bind(kind)
        .bind(hash)
        .bind(expires_at)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn get_token(db: &Db, hash: &str, kind: &str) -> Option<(String, String, String)> {
    sqlx::query_as("SELECT id, user_id, expires_at FROM tokens WHERE hash = ? AND kind = ?")
        .bind(hash)
        .bind(kind)
        .fetch_optional(db)
        .await
        .ok()
        .flatten()
}

pub async fn delete_token(db: &Db, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tokens WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_tokens_for_user(db: &Db, user_id: &str, kind: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tokens WHERE user_id = ? AND kind = ?")
        .bind(user_id)
        .bind(kind)
        .execute(db)
        .await?;
    Ok(())
}
