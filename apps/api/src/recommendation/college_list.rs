//! College List Generation: asks the college-list workflow for schools and
//! files them into reach / target / likely.

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::profile::{Bucket, College, CollegeList, Profile};
use crate::profile::summary::ensure_summary;
use crate::store::ProfileStore;
use crate::workflow_client::{inputs, Workflow, WorkflowKind};

pub const SUMMARY_INPUT: &str = "profile_summary";
pub const COLLEGE_LIST_OUTPUT: &str = "CollegeList";

/// One school as returned by the workflow, before normalisation.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSchool {
    #[serde(alias = "school")]
    pub name: String,
    pub category: String,
}

/// Buckets schools by their tag in input order. Unknown tags are dropped and
/// every record starts with no reasons.
pub fn bucket_schools(schools: Vec<GeneratedSchool>) -> CollegeList {
    let mut list = CollegeList::default();
    for school in schools {
        let Some(bucket) = Bucket::from_tag(&school.category) else {
            debug!("Dropping {} with unknown category '{}'", school.name, school.category);
            continue;
        };
        list.bucket_mut(bucket).push(College {
            name: school.name,
            category: bucket,
            reasons: Vec::new(),
        });
    }
    list
}

/// Generates a fresh list and replaces the stored one. Nothing is written
/// if the workflow fails or its answer does not parse.
pub async fn generate_college_list(
    store: &dyn ProfileStore,
    workflow: &dyn Workflow,
    profile: Profile,
) -> Result<(Profile, CollegeList), AppError> {
    let mut profile = ensure_summary(store, workflow, profile).await?;

    let outputs = workflow
        .run(
            WorkflowKind::CollegeList,
            inputs([(SUMMARY_INPUT, profile.profile_summary.as_str())]),
            &profile.email,
        )
        .await?;
    let schools: Vec<GeneratedSchool> = outputs.json(COLLEGE_LIST_OUTPUT)?;
    let received = schools.len();

    let mut list = bucket_schools(schools);
    list.last_generated = Some(Utc::now());

    profile.college_list = list.clone();
    store.save(&profile).await?;

    info!(
        "Generated college list for {}: {} reach, {} target, {} likely ({} of {} kept)",
        profile.email,
        list.reach.len(),
        list.target.len(),
        list.likely.len(),
        list.len(),
        received
    );
    Ok((profile, list))
}
