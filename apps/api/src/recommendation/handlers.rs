//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::profile::{ApplicationStrategies, CollegeList};
use crate::profile::account::normalize_email;
use crate::recommendation::college_list::generate_college_list;
use crate::recommendation::strategies::generate_strategies;
use crate::recommendation::why_reasons::{backfill_all_reasons, generate_why_reasons};
use crate::state::AppState;
use crate::store::load_profile;

#[derive(Debug, Deserialize)]
pub struct WhyRequest {
    pub school_name: String,
}

#[derive(Debug, Serialize)]
pub struct WhyResponse {
    pub school_name: String,
    pub reasons: Vec<String>,
}

/// POST /api/v1/profiles/:email/college-list
///
/// Generates a fresh list, discarding any previously cached reasons.
pub async fn handle_generate_college_list(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CollegeList>, AppError> {
    let profile = load_profile(state.store.as_ref(), &normalize_email(&email)).await?;
    let (_, list) =
        generate_college_list(state.store.as_ref(), state.workflow.as_ref(), profile).await?;
    Ok(Json(list))
}

/// POST /api/v1/profiles/:email/college-list/why
pub async fn handle_why_reasons(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(req): Json<WhyRequest>,
) -> Result<Json<WhyResponse>, AppError> {
    let profile = load_profile(state.store.as_ref(), &normalize_email(&email)).await?;
    let (_, reasons) = generate_why_reasons(
        state.store.as_ref(),
        state.workflow.as_ref(),
        profile,
        &req.school_name,
    )
    .await?;
    Ok(Json(WhyResponse {
        school_name: req.school_name.trim().to_string(),
        reasons,
    }))
}

/// POST /api/v1/profiles/:email/college-list/backfill
///
/// Bounded by `BACKFILL_TIMEOUT_SECS`; on timeout nothing is written.
pub async fn handle_backfill_reasons(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CollegeList>, AppError> {
    let profile = load_profile(state.store.as_ref(), &normalize_email(&email)).await?;
    let deadline = state.config.backfill_timeout;

    let profile = tokio::time::timeout(
        deadline,
        backfill_all_reasons(state.store.as_ref(), state.workflow.as_ref(), profile),
    )
    .await
    .map_err(|_| {
        AppError::Timeout(format!(
            "Reasons backfill did not finish within {}s",
            deadline.as_secs()
        ))
    })??;

    Ok(Json(profile.college_list))
}

/// POST /api/v1/profiles/:email/strategies
pub async fn handle_generate_strategies(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ApplicationStrategies>, AppError> {
    let profile = load_profile(state.store.as_ref(), &normalize_email(&email)).await?;
    let (_, strategies) =
        generate_strategies(state.store.as_ref(), state.workflow.as_ref(), profile).await?;
    Ok(Json(strategies))
}
