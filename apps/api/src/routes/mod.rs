pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::profile::handlers as profile;
use crate::recommendation::handlers as recommendation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/accounts", post(profile::handle_register))
        .route("/api/v1/accounts/login", post(profile::handle_login))
        // Question catalog
        .route("/api/v1/questions", get(profile::handle_list_questions))
        .route(
            "/api/v1/questions/:category",
            get(profile::handle_get_category),
        )
        // Profile
        .route("/api/v1/profiles/:email", get(profile::handle_get_profile))
        .route(
            "/api/v1/profiles/:email/answers/:category",
            put(profile::handle_update_answers),
        )
        .route(
            "/api/v1/profiles/:email/tracker",
            patch(profile::handle_update_tracker),
        )
        .route(
            "/api/v1/profiles/:email/discovered",
            patch(profile::handle_update_discovered),
        )
        // Recommendations
        .route(
            "/api/v1/profiles/:email/college-list",
            post(recommendation::handle_generate_college_list),
        )
        .route(
            "/api/v1/profiles/:email/college-list/why",
            post(recommendation::handle_why_reasons),
        )
        .route(
            "/api/v1/profiles/:email/college-list/backfill",
            post(recommendation::handle_backfill_reasons),
        )
        .route(
            "/api/v1/profiles/:email/strategies",
            post(recommendation::handle_generate_strategies),
        )
        .with_state(state)
}
