use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::profile::{Profile, Tracker};
use crate::profile::account::{create_account, login, normalize_email};
use crate::profile::catalog::{self, CategoryDef, CATALOG};
use crate::profile::merge::DiscoveredUpdate;
use crate::profile::updates::{update_answers, update_discovered, update_tracker};
use crate::state::AppState;
use crate::store::load_profile;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/accounts
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = create_account(state.store.as_ref(), &req.email, &req.name, &req.password).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /api/v1/accounts/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = login(state.store.as_ref(), &req.email, &req.password).await?;
    Ok(Json(profile))
}

/// GET /api/v1/profiles/:email
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let profile = load_profile(state.store.as_ref(), &normalize_email(&email)).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/profiles/:email/answers/:category
///
/// Body is an object of question id to answer, e.g. `{"a1": "3.8 - 4.0"}`.
/// Replaces every stored answer in the category.
pub async fn handle_update_answers(
    State(state): State<AppState>,
    Path((email, category)): Path<(String, String)>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Profile>, AppError> {
    let answers = answer_pairs(body)?;
    let profile = update_answers(
        state.store.as_ref(),
        state.workflow.as_ref(),
        &normalize_email(&email),
        &category,
        &answers,
    )
    .await?;
    Ok(Json(profile))
}

/// PATCH /api/v1/profiles/:email/tracker
pub async fn handle_update_tracker(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(update): Json<Tracker>,
) -> Result<Json<Profile>, AppError> {
    let profile = update_tracker(
        state.store.as_ref(),
        state.workflow.as_ref(),
        &normalize_email(&email),
        update,
    )
    .await?;
    Ok(Json(profile))
}

/// PATCH /api/v1/profiles/:email/discovered
pub async fn handle_update_discovered(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(update): Json<DiscoveredUpdate>,
) -> Result<Json<Profile>, AppError> {
    let profile = update_discovered(
        state.store.as_ref(),
        state.workflow.as_ref(),
        &normalize_email(&email),
        update,
    )
    .await?;
    Ok(Json(profile))
}

/// GET /api/v1/questions
pub async fn handle_list_questions() -> Json<&'static [CategoryDef]> {
    Json(CATALOG)
}

/// GET /api/v1/questions/:category
pub async fn handle_get_category(
    Path(category): Path<String>,
) -> Result<Json<&'static CategoryDef>, AppError> {
    catalog::category(&category)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category '{category}' not found")))
}

/// Flattens an answers object into ordered `(question_id, answer)` pairs.
/// Multi-select answers (arrays of strings) are joined with ", ".
fn answer_pairs(body: Map<String, Value>) -> Result<Vec<(String, String)>, AppError> {
    body.into_iter()
        .map(|(question_id, value)| {
            let answer = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            AppError::Validation(format!(
                                "Answer to '{question_id}' must be a string or list of strings"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?
                    .join(", "),
                _ => {
                    return Err(AppError::Validation(format!(
                        "Answer to '{question_id}' must be a string or list of strings"
                    )))
                }
            };
            Ok((question_id, answer))
        })
        .collect()
}
