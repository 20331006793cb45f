//! Profile mutations: load, merge, regenerate the summary, save.

use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{Profile, Tracker};
use crate::profile::catalog::is_known_category;
use crate::profile::merge::{apply_answers, merge_discovered, merge_tracker, DiscoveredUpdate};
use crate::profile::summary::refresh_summary;
use crate::store::{load_profile, ProfileStore};
use crate::workflow_client::Workflow;

pub async fn update_answers(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    email: &str,
    category: &str,
    answers: &[(String, String)],
) -> Result<Profile, AppError> {
    if !is_known_category(category) {
        return Err(AppError::Validation(format!("Unknown category '{category}'")));
    }

    let profile = load_profile(store, email).await?;
    let profile = apply_answers(profile, category, answers);
    let profile = refresh_summary(workflow, profile).await;
    store.save(&profile).await?;

    info!(
        "Recorded {} {} answers for {}",
        answers.len(),
        category,
        email
    );
    Ok(profile)
}

pub async fn update_tracker(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    email: &str,
    update: Tracker,
) -> Result<Profile, AppError> {
    let mut profile = load_profile(store, email).await?;
    profile.tracker = merge_tracker(&profile.tracker, update);
    let profile = refresh_summary(workflow, profile).await;
    store.save(&profile).await?;
    Ok(profile)
}

pub async fn update_discovered(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    email: &str,
    update: DiscoveredUpdate,
) -> Result<Profile, AppError> {
    let mut profile = load_profile(store, email).await?;
    profile.discovered = merge_discovered(&profile.discovered, update);
    let profile = refresh_summary(workflow, profile).await;
    store.save(&profile).await?;
    Ok(profile)
}
