//! Account creation and login. Credentials are stored as argon2id PHC strings.

use anyhow::anyhow;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::store::ProfileStore;

const MIN_PASSWORD_LEN: usize = 8;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub async fn create_account(
    store: &dyn ProfileStore,
    email: &str,
    name: &str,
    password: &str,
) -> Result<Profile, AppError> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let profile = Profile::new(email, name.to_string(), hash_password(password)?);
    store.insert(&profile).await?;
    info!("Created profile for {}", profile.email);
    Ok(profile)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(store: &dyn ProfileStore, email: &str, password: &str) -> Result<Profile, AppError> {
    let profile = store
        .find_by_email(&normalize_email(email))
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(password, &profile.password_hash) {
        return Err(AppError::Unauthorized);
    }
    Ok(profile)
}
