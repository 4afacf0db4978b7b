//! Credential vault: registration and login verification over the `users`
//! table. Passwords are stored as argon2 PHC strings with a fresh random salt
//! per call, so the same password never hashes to the same stored value and
//! the plaintext is never recoverable. Identity uniqueness is enforced by the
//! store's UNIQUE constraint rather than a pre-check, which resolves
//! concurrent registrations of the same email without an application lock.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rusqlite::{OptionalExtension, params};

use crate::error::{AppError, AppResult};
use crate::storage::{Store, StoreError};

/// Minimum accepted password length for registration.
pub const MIN_PASSWORD_LEN: usize = 4;

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

fn is_unique_violation(err: &StoreError) -> bool {
    matches!(
        err,
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Create a user record for `email` with an irreversible hash of `password`.
///
/// Rejects an empty email or a password shorter than [`MIN_PASSWORD_LEN`]
/// with `UserInput`; a duplicate email fails with `Conflict`.
pub async fn register(store: &Store, email: &str, password: &str) -> AppResult<()> {
    if email.is_empty() || password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::user("invalid_credentials_input", "invalid data"));
    }
    let hash = hash_password(password)
        .map_err(|e| AppError::internal("hash_failed".to_string(), e.to_string()))?;
    let email = email.to_string();
    store
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (email, password_hash) VALUES (?1, ?2)",
                params![email, hash],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("email_exists", "email exists")
            } else {
                AppError::from(e)
            }
        })
}

/// Verify `password` against the stored hash for `email`.
///
/// A missing identity and a wrong password return the identical `Auth` error
/// so the response never reveals whether the email is registered.
pub async fn authenticate(store: &Store, email: &str, password: &str) -> AppResult<()> {
    let email = email.to_string();
    let stored: Option<String> = store
        .call(move |conn| {
            let hash = conn
                .query_row(
                    "SELECT password_hash FROM users WHERE email = ?1",
                    params![email],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hash)
        })
        .await
        .map_err(AppError::from)?;

    match stored {
        Some(hash) if verify_password(&hash, password) => Ok(()),
        _ => Err(AppError::auth("invalid_credentials", "invalid credentials")),
    }
}
