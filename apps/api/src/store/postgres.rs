use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::errors::AppError;
use crate::models::profile::{
    Answer, ApplicationStrategies, Bucket, CollegeList, Discovered, Profile, Tracker,
};
use crate::store::ProfileStore;

#[derive(Debug, FromRow)]
struct ProfileRow {
    email: String,
    name: String,
    password_hash: String,
    questionnaire: Json<Vec<Answer>>,
    discovered: Json<Discovered>,
    tracker: Json<Tracker>,
    college_list: Json<CollegeList>,
    profile_summary: String,
    application_strategies: Option<Json<ApplicationStrategies>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            questionnaire: row.questionnaire.0,
            discovered: row.discovered.0,
            tracker: row.tracker.0,
            college_list: row.college_list.0,
            profile_summary: row.profile_summary,
            application_strategies: row.application_strategies.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `ProfileStore` over the `profiles` table. Nested records live in JSONB
/// columns so a profile reads and writes as one document.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn insert(&self, profile: &Profile) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles
                (email, name, password_hash, questionnaire, discovered, tracker,
                 college_list, profile_summary, application_strategies, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.password_hash)
        .bind(Json(&profile.questionnaire))
        .bind(Json(&profile.discovered))
        .bind(Json(&profile.tracker))
        .bind(Json(&profile.college_list))
        .bind(&profile.profile_summary)
        .bind(profile.application_strategies.as_ref().map(Json))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "An account for {} already exists",
                profile.email
            )));
        }
        Ok(())
    }

    async fn save(&self, profile: &Profile) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                name = $2,
                questionnaire = $3,
                discovered = $4,
                tracker = $5,
                college_list = $6,
                profile_summary = $7,
                application_strategies = $8,
                updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(Json(&profile.questionnaire))
        .bind(Json(&profile.discovered))
        .bind(Json(&profile.tracker))
        .bind(Json(&profile.college_list))
        .bind(&profile.profile_summary)
        .bind(profile.application_strategies.as_ref().map(Json))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Profile {} not found",
                profile.email
            )));
        }
        debug!("Saved profile {}", profile.email);
        Ok(())
    }

    async fn update_summary(&self, email: &str, summary: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE profiles SET profile_summary = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(summary)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile {email} not found")));
        }
        debug!("Updated summary for {email}");
        Ok(())
    }

    async fn update_college_reasons(
        &self,
        email: &str,
        bucket: Bucket,
        school_name: &str,
        reasons: &[String],
    ) -> Result<bool, AppError> {
        // Locate the element and patch it in one statement so concurrent
        // writes to sibling records are not overwritten.
        let result = sqlx::query(
            r#"
            UPDATE profiles p
            SET college_list = jsonb_set(
                    p.college_list,
                    ARRAY[$2, (m.ord - 1)::text, 'reasons'],
                    $4
                ),
                updated_at = NOW()
            FROM (
                SELECT e.ord
                FROM profiles q,
                     jsonb_array_elements(q.college_list -> $2) WITH ORDINALITY AS e(item, ord)
                WHERE q.email = $1 AND e.item ->> 'name' = $3
                ORDER BY e.ord
                LIMIT 1
            ) m
            WHERE p.email = $1
            "#,
        )
        .bind(email)
        .bind(bucket.as_str())
        .bind(school_name)
        .bind(Json(reasons))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
