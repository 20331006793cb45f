//! Application Strategy Generation: early decision / early action picks and
//! strengths to highlight, derived from the summary and the college list.

use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{ApplicationStrategies, Bucket, CollegeList, Profile};
use crate::profile::summary::ensure_summary;
use crate::store::ProfileStore;
use crate::workflow_client::{inputs, Workflow, WorkflowKind};

pub const SUMMARY_INPUT: &str = "profile_summary";
pub const COLLEGE_LIST_INPUT: &str = "college_list";
pub const ANSWER_OUTPUT: &str = "answer";

/// School names under "Reach:", "Target:" and "Likely:" headers.
pub fn render_college_listing(list: &CollegeList) -> String {
    let mut text = String::new();
    for bucket in Bucket::ALL {
        text.push_str(bucket.title());
        text.push_str(":\n");
        for college in list.bucket(bucket) {
            text.push_str(&format!("- {}\n", college.name));
        }
    }
    text.trim_end().to_string()
}

pub async fn generate_strategies(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    profile: Profile,
) -> Result<(Profile, ApplicationStrategies), AppError> {
    if profile.college_list.is_empty() {
        return Err(AppError::Validation(
            "No college list found. Generate a college list before requesting strategies."
                .to_string(),
        ));
    }

    let mut profile = ensure_summary(store, workflow, profile).await?;
    let listing = render_college_listing(&profile.college_list);

    let outputs = workflow
        .run(
            WorkflowKind::Strategies,
            inputs([
                (SUMMARY_INPUT, profile.profile_summary.as_str()),
                (COLLEGE_LIST_INPUT, listing.as_str()),
            ]),
            &profile.email,
        )
        .await?;
    let strategies: ApplicationStrategies = outputs.json(ANSWER_OUTPUT)?;

    profile.application_strategies = Some(strategies.clone());
    store.save(&profile).await?;

    info!(
        "Generated strategies for {}: {} ED, {} EA",
        profile.email,
        strategies.early_decision.len(),
        strategies.early_action.len()
    );
    Ok((profile, strategies))
}
