//! Summary Generator: renders the profile as text and asks the summary
//! workflow to turn it into prose. This is the only AI call that never fails:
//! on any error the rendered text itself becomes the summary.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::store::ProfileStore;
use crate::workflow_client::{inputs, Workflow, WorkflowKind};

pub const SUMMARY_INPUT: &str = "profile";
pub const SUMMARY_OUTPUT: &str = "summary";

/// Deterministic plain-text rendering of a profile.
pub fn render_profile_text(profile: &Profile) -> String {
    let mut text = format!("Student Profile: {}\n", profile.name);
    for answer in &profile.questionnaire {
        text.push_str(&format!("{}: {}\n", answer.question, answer.answer));
    }
    if !profile.discovered.interests.is_empty() {
        text.push_str(&format!(
            "Interests: {}\n",
            profile.discovered.interests.join(", ")
        ));
    }
    if !profile.discovered.strengths.is_empty() {
        text.push_str(&format!(
            "Strengths: {}\n",
            profile.discovered.strengths.join(", ")
        ));
    }
    text.trim().to_string()
}

pub async fn generate_summary(workflow: &dyn Workflow, profile: &Profile) -> String {
    let rendered = render_profile_text(profile);

    let result = workflow
        .run(
            WorkflowKind::Summary,
            inputs([(SUMMARY_INPUT, rendered.as_str())]),
            &profile.email,
        )
        .await
        .map_err(AppError::from)
        .and_then(|outputs| {
            let summary = outputs.text(SUMMARY_OUTPUT)?;
            if summary.trim().is_empty() {
                return Err(AppError::Parse("workflow returned an empty summary".to_string()));
            }
            Ok(summary.to_string())
        });

    match result {
        Ok(summary) => summary,
        Err(e) => {
            warn!(
                kind = e.kind(),
                "Summary generation failed for {}, using rendered profile: {e}",
                profile.email
            );
            rendered
        }
    }
}

/// Regenerates the cached summary. Called after every questionnaire,
/// tracker, or discovered-attribute mutation.
pub async fn refresh_summary(workflow: &dyn Workflow, mut profile: Profile) -> Profile {
    profile.profile_summary = generate_summary(workflow, &profile).await;
    profile
}

/// Read-through: if no summary is cached, generate one and persist just
/// that column before returning.
pub async fn ensure_summary(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    profile: Profile,
) -> Result<Profile, AppError> {
    if !profile.profile_summary.trim().is_empty() {
        return Ok(profile);
    }
    let profile = refresh_summary(workflow, profile).await;
    store
        .update_summary(&profile.email, &profile.profile_summary)
        .await?;
    info!("Populated missing summary for {}", profile.email);
    Ok(profile)
}
