//! In-memory collaborators for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::profile::{Bucket, Profile};
use crate::store::ProfileStore;
use crate::workflow_client::{Workflow, WorkflowError, WorkflowKind, WorkflowOutputs};

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<String, Profile>>,
    saves: Mutex<usize>,
    targeted_updates: Mutex<usize>,
    summary_updates: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        let store = Self::new();
        store
            .profiles
            .lock()
            .unwrap()
            .insert(profile.email.clone(), profile);
        store
    }

    pub fn get(&self, email: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(email).cloned()
    }

    /// Simulates another request writing the stored document directly.
    pub fn put(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.email.clone(), profile);
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    pub fn targeted_update_count(&self) -> usize {
        *self.targeted_updates.lock().unwrap()
    }

    pub fn summary_update_count(&self) -> usize {
        *self.summary_updates.lock().unwrap()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.get(email))
    }

    async fn insert(&self, profile: &Profile) -> Result<(), AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(&profile.email) {
            return Err(AppError::Conflict(format!(
                "An account for {} already exists",
                profile.email
            )));
        }
        profiles.insert(profile.email.clone(), profile.clone());
        Ok(())
    }

    async fn save(&self, profile: &Profile) -> Result<(), AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        if !profiles.contains_key(&profile.email) {
            return Err(AppError::NotFound(format!("Profile {} not found", profile.email)));
        }
        profiles.insert(profile.email.clone(), profile.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    async fn update_summary(&self, email: &str, summary: &str) -> Result<(), AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(email)
            .ok_or_else(|| AppError::NotFound(format!("Profile {email} not found")))?;
        profile.profile_summary = summary.to_string();
        *self.summary_updates.lock().unwrap() += 1;
        Ok(())
    }

    async fn update_college_reasons(
        &self,
        email: &str,
        bucket: Bucket,
        school_name: &str,
        reasons: &[String],
    ) -> Result<bool, AppError> {
        *self.targeted_updates.lock().unwrap() += 1;
        let mut profiles = self.profiles.lock().unwrap();
        let matched = profiles
            .get_mut(email)
            .and_then(|p| {
                p.college_list
                    .bucket_mut(bucket)
                    .iter_mut()
                    .find(|c| c.name == school_name)
            })
            .map(|college| college.reasons = reasons.to_vec())
            .is_some();
        Ok(matched)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: WorkflowKind,
    pub inputs: HashMap<String, String>,
    pub user: String,
}

/// A `Workflow` that replays queued responses per kind and records every
/// call. An unscripted call fails.
#[derive(Default)]
pub struct ScriptedWorkflow {
    responses: Mutex<HashMap<WorkflowKind, VecDeque<Option<WorkflowOutputs>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_ok(&self, kind: WorkflowKind, outputs: WorkflowOutputs) {
        self.responses
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(Some(outputs));
    }

    pub fn push_text(&self, kind: WorkflowKind, field: &str, value: &str) {
        self.push_ok(kind, WorkflowOutputs::from_pairs([(field, value)]));
    }

    pub fn push_err(&self, kind: WorkflowKind) {
        self.responses
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(None);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, kind: WorkflowKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }
}

#[async_trait]
impl Workflow for ScriptedWorkflow {
    async fn run(
        &self,
        kind: WorkflowKind,
        inputs: HashMap<String, String>,
        user: &str,
    ) -> Result<WorkflowOutputs, WorkflowError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            inputs,
            user: user.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Some(outputs)) => Ok(outputs),
            Some(None) => Err(WorkflowError::Api {
                status: 503,
                message: "simulated outage".to_string(),
            }),
            None => Err(WorkflowError::RunFailed {
                status: "unscripted".to_string(),
                message: format!("no response queued for {}", kind.as_str()),
            }),
        }
    }
}
