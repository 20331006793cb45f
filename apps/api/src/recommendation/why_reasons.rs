//! Why-Reasons: per-school justifications, generated at most once per
//! school and cached on the college record.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::profile::{Bucket, Profile};
use crate::profile::summary::ensure_summary;
use crate::store::ProfileStore;
use crate::workflow_client::{inputs, Workflow, WorkflowKind};

pub const SUMMARY_INPUT: &str = "profile_summary";
pub const SCHOOL_INPUT: &str = "school_name";
pub const REASONING_OUTPUT: &str = "reasoning";

async fn request_reasons(
    workflow: &dyn Workflow,
    profile: &Profile,
    school_name: &str,
) -> Result<Vec<String>, AppError> {
    let outputs = workflow
        .run(
            WorkflowKind::WhyReasons,
            inputs([
                (SUMMARY_INPUT, profile.profile_summary.as_str()),
                (SCHOOL_INPUT, school_name),
            ]),
            &profile.email,
        )
        .await?;
    Ok(outputs.json(REASONING_OUTPUT)?)
}

/// Returns the reasons for `school_name`, serving cached ones when present.
///
/// Fresh reasons are written onto the matching record with a targeted
/// update. If the school is not on the list they are returned unsaved.
pub async fn generate_why_reasons(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    profile: Profile,
    school_name: &str,
) -> Result<(Profile, Vec<String>), AppError> {
    let school_name = school_name.trim();
    if school_name.is_empty() {
        return Err(AppError::Validation("school_name cannot be empty".to_string()));
    }

    let existing = profile
        .college_list
        .find(school_name)
        .map(|(bucket, college)| (bucket, college.reasons.clone()));
    let matched: Option<Bucket> = match existing {
        Some((_, cached)) if !cached.is_empty() => return Ok((profile, cached)),
        Some((bucket, _)) => Some(bucket),
        None => None,
    };

    let mut profile = ensure_summary(store, workflow, profile).await?;
    let reasons = request_reasons(workflow, &profile, school_name).await?;

    match matched {
        Some(bucket) => {
            let updated = store
                .update_college_reasons(&profile.email, bucket, school_name, &reasons)
                .await?;
            if !updated {
                warn!(
                    "No stored {} record named {school_name} for {}; reasons not saved",
                    bucket.as_str(),
                    profile.email
                );
            }
            if let Some(college) = profile.college_list.find_mut(school_name) {
                college.reasons = reasons.clone();
            }
            info!(
                "Generated {} reasons for {school_name} ({})",
                reasons.len(),
                profile.email
            );
        }
        None => {
            info!("{school_name} is not on {}'s list; reasons not saved", profile.email);
        }
    }

    Ok((profile, reasons))
}

/// Fills in reasons for every record that has none, one school at a time.
///
/// The whole profile is written once at the end, and only if some record
/// received reasons. Any failure aborts the sweep without writing.
pub async fn backfill_all_reasons(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    profile: Profile,
) -> Result<Profile, AppError> {
    let pending: Vec<(Bucket, usize)> = Bucket::ALL
        .into_iter()
        .flat_map(|bucket| {
            profile
                .college_list
                .bucket(bucket)
                .iter()
                .enumerate()
                .filter(|(_, c)| c.reasons.is_empty())
                .map(move |(idx, _)| (bucket, idx))
                .collect::<Vec<_>>()
        })
        .collect();

    if pending.is_empty() {
        return Ok(profile);
    }

    let mut profile = ensure_summary(store, workflow, profile).await?;

    let mut filled = 0;
    for (bucket, idx) in &pending {
        let name = profile.college_list.bucket(*bucket)[*idx].name.clone();
        let reasons = request_reasons(workflow, &profile, &name).await?;
        if !reasons.is_empty() {
            filled += 1;
        }
        profile.college_list.bucket_mut(*bucket)[*idx].reasons = reasons;
    }

    if filled == 0 {
        info!(
            "Backfill for {} produced no reasons for {} schools; nothing saved",
            profile.email,
            pending.len()
        );
        return Ok(profile);
    }

    store.save(&profile).await?;
    info!(
        "Backfilled reasons for {filled} of {} schools ({})",
        pending.len(),
        profile.email
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::College;
    use crate::test_support::{MemoryStore, ScriptedWorkflow};

    const EMAIL: &str = "sam@example.com";

    fn college(name: &str, category: Bucket, reasons: &[&str]) -> College {
        College {
            name: name.into(),
            category,
            reasons: reasons.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn listed_profile() -> Profile {
        let mut profile = Profile::new(EMAIL.into(), "Sam".into(), "hash".into());
        profile.profile_summary = "Sam loves robotics.".into();
        profile.college_list.reach.push(college("MIT", Bucket::Reach, &[]));
        profile.college_list.target.push(college("Purdue", Bucket::Target, &[]));
        profile
            .college_list
            .likely
            .push(college("Iowa State", Bucket::Likely, &["Great aerospace program"]));
        profile
    }

    #[tokio::test]
    async fn test_why_reasons_are_memoized() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(
            WorkflowKind::WhyReasons,
            REASONING_OUTPUT,
            r#"["Top robotics lab", "Strong co-op culture"]"#,
        );

        let (profile, first) = generate_why_reasons(&store, &workflow, profile, "MIT")
            .await
            .unwrap();
        let (_, second) = generate_why_reasons(&store, &workflow, profile, "MIT")
            .await
            .unwrap();

        assert_eq!(first, vec!["Top robotics lab", "Strong co-op culture"]);
        assert_eq!(first, second);
        assert_eq!(workflow.calls_of(WorkflowKind::WhyReasons), 1);
    }

    #[tokio::test]
    async fn test_why_reasons_uses_targeted_update_only() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["Fit"]"#);

        generate_why_reasons(&store, &workflow, profile, "Purdue")
            .await
            .unwrap();

        assert_eq!(store.targeted_update_count(), 1);
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.get(EMAIL).unwrap().college_list.target[0].reasons, vec!["Fit"]);
    }

    #[tokio::test]
    async fn test_why_reasons_does_not_clobber_concurrent_sibling_write() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());

        // Another request fills MIT's reasons after this copy was loaded.
        let mut concurrent = profile.clone();
        concurrent.college_list.reach[0].reasons = vec!["Written elsewhere".into()];
        store.put(concurrent);

        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["Fit"]"#);
        generate_why_reasons(&store, &workflow, profile, "Purdue")
            .await
            .unwrap();

        let stored = store.get(EMAIL).unwrap();
        assert_eq!(stored.college_list.reach[0].reasons, vec!["Written elsewhere"]);
        assert_eq!(stored.college_list.target[0].reasons, vec!["Fit"]);
    }

    #[tokio::test]
    async fn test_why_reasons_serves_cached_without_call() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();

        let (_, reasons) = generate_why_reasons(&store, &workflow, profile, "Iowa State")
            .await
            .unwrap();
        assert_eq!(reasons, vec!["Great aerospace program"]);
        assert!(workflow.calls().is_empty());
    }

    #[tokio::test]
    async fn test_why_reasons_for_unlisted_school_are_not_persisted() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["Nice campus"]"#);

        let (updated, reasons) = generate_why_reasons(&store, &workflow, profile.clone(), "Rice")
            .await
            .unwrap();

        assert_eq!(reasons, vec!["Nice campus"]);
        assert_eq!(updated.college_list, profile.college_list);
        assert_eq!(store.targeted_update_count(), 0);
        assert_eq!(store.save_count(), 0);

        let calls = workflow.calls();
        assert_eq!(calls[0].inputs[SCHOOL_INPUT], "Rice");
        assert_eq!(calls[0].inputs[SUMMARY_INPUT], "Sam loves robotics.");
    }

    #[tokio::test]
    async fn test_why_reasons_rejects_blank_school() {
        let store = MemoryStore::with_profile(listed_profile());
        let workflow = ScriptedWorkflow::new();
        let result = generate_why_reasons(&store, &workflow, listed_profile(), "  ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_why_reasons_parse_failure_propagates() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, "Because it is great.");

        let result = generate_why_reasons(&store, &workflow, profile, "MIT").await;
        assert!(matches!(result, Err(AppError::Parse(_))));
        assert_eq!(store.targeted_update_count(), 0);
    }

    #[tokio::test]
    async fn test_backfill_fills_only_empty_records_in_order() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["MIT reason"]"#);
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["Purdue reason"]"#);

        let updated = backfill_all_reasons(&store, &workflow, profile).await.unwrap();

        assert_eq!(updated.college_list.reach[0].reasons, vec!["MIT reason"]);
        assert_eq!(updated.college_list.target[0].reasons, vec!["Purdue reason"]);
        assert_eq!(
            updated.college_list.likely[0].reasons,
            vec!["Great aerospace program"]
        );

        let schools: Vec<_> = workflow
            .calls()
            .iter()
            .map(|c| c.inputs[SCHOOL_INPUT].clone())
            .collect();
        assert_eq!(schools, ["MIT", "Purdue"]);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.get(EMAIL).unwrap(), updated);
    }

    #[tokio::test]
    async fn test_backfill_without_gaps_makes_no_write() {
        let mut profile = listed_profile();
        profile.college_list.reach[0].reasons = vec!["a".into()];
        profile.college_list.target[0].reasons = vec!["b".into()];
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();

        let updated = backfill_all_reasons(&store, &workflow, profile.clone()).await.unwrap();
        assert_eq!(updated, profile);
        assert!(workflow.calls().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_backfill_with_only_empty_replies_makes_no_write() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, "[]");
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, "[]");

        let updated = backfill_all_reasons(&store, &workflow, profile.clone()).await.unwrap();

        assert_eq!(updated, profile);
        assert_eq!(workflow.calls_of(WorkflowKind::WhyReasons), 2);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_why_reasons_populates_summary_without_whole_document_write() {
        let mut profile = listed_profile();
        profile.profile_summary.clear();
        let store = MemoryStore::with_profile(profile.clone());

        // A sibling record changes after this copy was loaded.
        let mut concurrent = profile.clone();
        concurrent.college_list.reach[0].reasons = vec!["Written elsewhere".into()];
        store.put(concurrent);

        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::Summary, "summary", "Sam builds robots.");
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["Fit"]"#);

        let (updated, _) = generate_why_reasons(&store, &workflow, profile, "Purdue")
            .await
            .unwrap();

        assert_eq!(updated.profile_summary, "Sam builds robots.");
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.summary_update_count(), 1);
        let stored = store.get(EMAIL).unwrap();
        assert_eq!(stored.profile_summary, "Sam builds robots.");
        assert_eq!(stored.college_list.reach[0].reasons, vec!["Written elsewhere"]);
        assert_eq!(stored.college_list.target[0].reasons, vec!["Fit"]);
        assert_eq!(
            workflow.calls()[1].inputs[SUMMARY_INPUT],
            "Sam builds robots."
        );
    }

    #[tokio::test]
    async fn test_backfill_failure_mid_sweep_writes_nothing() {
        let profile = listed_profile();
        let store = MemoryStore::with_profile(profile.clone());
        let workflow = ScriptedWorkflow::new();
        workflow.push_text(WorkflowKind::WhyReasons, REASONING_OUTPUT, r#"["MIT reason"]"#);
        workflow.push_err(WorkflowKind::WhyReasons);

        let result = backfill_all_reasons(&store, &workflow, profile.clone()).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.get(EMAIL).unwrap(), profile);
    }
}
