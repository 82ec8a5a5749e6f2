use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::{self, Db, User};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email already registered")]
    EmailExists,
    #[error("Username already taken")]
    UsernameExists,
    #[error("Account locked")]
    AccountLocked,
    #[error("Invalid verification link")]
    InvalidToken,
    #[error("Verification link has expired")]
    ExpiredToken,
    #[error("Email is already verified")]
    AlreadyVerified,
    #[error("{0}")]
    InvalidUsername(String),
    #[error("Password must be at least 8 characters long")]
    WeakPassword,
    #[error("{0}")]
    Other(String),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Other(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|h| Argon2::default().verify_password(password.as_bytes(), &h).is_ok())
        .unwrap_or(false)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.len() < 3 {
        return Err(AuthError::InvalidUsername(
            "Username must be at least 3 characters long".into(),
        ));
    }
    if username.len() > 30 {
        return Err(AuthError::InvalidUsername(
            "Username must be less than 30 characters long".into(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, and underscores".into(),
        ));
    }
    if username.starts_with('_') || username.ends_with('_') {
        return Err(AuthError::InvalidUsername(
            "Username cannot start or end with underscore".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

pub async fn register(
    db: &Db,
    email: &str,
    username: &str,
    password: &str,
) -> Result<String, AuthError> {
    validate_username(username)?;
    validate_password(password)?;
    if db::get_user_by_email(db, email).await.is_some() {
        return Err(AuthError::EmailExists);
    }
    if db::get_user_by_username(db, username).await.is_some() {
        return Err(AuthError::UsernameExists);
    }
    let id = Uuid::new_v4().to_string();
    let hash = hash_password(password)?;
    db::create_user(db, &id, email, username, &hash)
        .await
        .map_err(|e| AuthError::Other(e.to_string()))?;
    Ok(id)
}

pub async fn login(db: &Db, email: &str, password: &str) -> Result<User, AuthError> {
    let user = db::get_user_by_email(db, email)
        .await
        .ok_or(AuthError::InvalidCredentials)?;

    // Check lockout
    if let Some(ref locked) = user.locked_until {
        if chrono::DateTime::parse_from_rfc3339(locked)
            .map(|t| t > Utc::now())
            .unwrap_or(false)
        {
            return Err(AuthError::AccountLocked);
        }
    }

    if !verify_password(password, &user.password_hash) {
        let attempts = user.failed_attempts + 1;
        let locked = if attempts >= 5 {
            Some((Utc::now() + Duration::minutes(15)).to_rfc3339())
        } else {
            None
        };
        let _ = db::update_failed_attempts(db, &user.id, attempts, locked.as_deref()).await;
        return Err(AuthError::InvalidCredentials);
    }

    let _ = db::update_failed_attempts(db, &user.id, 0, None).await;
    Ok(user)
}

/// Mint a 24-hour single-use verification token. Only its SHA-256 digest is
/// stored; the raw value goes into the emailed link. Any previous tokens for
/// the user are dropped so the newest link is the only live one.
pub async fn create_verification_token(db: &Db, user_id: &str) -> Result<String, AuthError> {
    let _ = db::delete_tokens_for_user(db, user_id, "verify").await;
    let token = Uuid::new_v4().to_string();
    let expires = (Utc::now() + Duration::hours(24)).to_rfc3339();
    db::create_token(
        db,
        &Uuid::new_v4().to_string(),
        user_id,
        "verify",
        &hash_token(&token),
        &expires,
    )
    .await
    .map_err(|e| AuthError::Other(e.to_string()))?;
    Ok(token)
}

/// Look up and consume a token, distinguishing a missing token from an
/// expired one so the caller can report each differently. Expired tokens are
/// deleted on sight.
async fn consume_token(db: &Db, token: &str, kind: &str) -> Result<String, AuthError> {
    let (id, user_id, expires) = db::get_token(db, &hash_token(token), kind)
        .await
        .ok_or(AuthError::InvalidToken)?;
    let expired = chrono::DateTime::parse_from_rfc3339(&expires)
        .map(|t| t < Utc::now())
        .unwrap_or(true);
    let _ = db::delete_token(db, &id).await;
    if expired {
        return Err(AuthError::ExpiredToken);
    }
    Ok(user_id)
}

pub async fn verify_email(db: &Db, token: &str) -> Result<(), AuthError> {
    let user_id = consume_token(db, token, "verify").await?;
    let user = db::get_user_by_id(db, &user_id)
        .await
        .ok_or(AuthError::InvalidToken)?;
    if user.email_verified {
        return Err(AuthError::AlreadyVerified);
    }
    db::verify_user_email(db, &user_id)
        .await
        .map_err(|e| AuthError::Other(e.to_string()))
}
