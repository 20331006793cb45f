//! Profile persistence. The core only sees the `ProfileStore` trait;
//! `PgProfileStore` is the production backend.

pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::profile::{Bucket, Profile};

pub use postgres::PgProfileStore;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError>;

    /// Creates a new profile. Fails with `Conflict` if the email is taken.
    async fn insert(&self, profile: &Profile) -> Result<(), AppError>;

    /// Whole-document write. Fails with `NotFound` if the profile is gone.
    async fn save(&self, profile: &Profile) -> Result<(), AppError>;

    /// Sets only the cached summary. Fails with `NotFound` if the profile
    /// is gone.
    async fn update_summary(&self, email: &str, summary: &str) -> Result<(), AppError>;

    /// Sets `reasons` on the first college named `school_name` within
    /// `bucket`, touching nothing else in the document.
    /// Returns `false` when no record matched.
    async fn update_college_reasons(
        &self,
        email: &str,
        bucket: Bucket,
        school_name: &str,
        reasons: &[String],
    ) -> Result<bool, AppError>;
}

/// Loads a profile or fails with `NotFound`.
pub async fn load_profile(store: &dyn ProfileStore, email: &str) -> Result<Profile, AppError> {
    store
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {email} not found")))
}
