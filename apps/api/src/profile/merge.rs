//! Merge policies for partial profile updates.
//!
//! Questionnaire: a category is replaced wholesale, other categories are
//! untouched. Tracker: per top-level key, present overwrites, absent
//! preserves. Discovered: per list, present replaces (or appends), absent
//! preserves.

use serde::Deserialize;

use crate::models::profile::{Answer, Discovered, Profile, Tracker};
use crate::profile::catalog::{question_text, UNKNOWN_QUESTION};

/// Returns the questionnaire with `category` replaced by `answers`.
///
/// Records of other categories keep their relative order and come first;
/// the new records follow in input order. An empty `answers` clears the
/// category.
pub fn merge_answers(profile: &Profile, category: &str, answers: &[(String, String)]) -> Vec<Answer> {
    let fresh = answers.iter().map(|(question_id, answer)| Answer {
        question_id: question_id.clone(),
        category: category.to_string(),
        question: question_text(category, question_id)
            .unwrap_or(UNKNOWN_QUESTION)
            .to_string(),
        answer: answer.clone(),
    });

    profile
        .questionnaire
        .iter()
        .filter(|a| a.category != category)
        .cloned()
        .chain(fresh)
        .collect()
}

pub fn apply_answers(mut profile: Profile, category: &str, answers: &[(String, String)]) -> Profile {
    profile.questionnaire = merge_answers(&profile, category, answers);
    profile
}

pub fn merge_tracker(existing: &Tracker, update: Tracker) -> Tracker {
    Tracker {
        sat: update.sat.or_else(|| existing.sat.clone()),
        act: update.act.or_else(|| existing.act.clone()),
        gpa: update.gpa.or_else(|| existing.gpa.clone()),
        competitions: update.competitions.or_else(|| existing.competitions.clone()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    #[default]
    Replace,
    Append,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveredUpdate {
    pub interests: Option<Vec<String>>,
    pub strengths: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
    #[serde(default)]
    pub mode: MergeMode,
}

pub fn merge_discovered(existing: &Discovered, update: DiscoveredUpdate) -> Discovered {
    let mode = update.mode;
    let merge = |current: &Vec<String>, incoming: Option<Vec<String>>| match (incoming, mode) {
        (None, _) => current.clone(),
        (Some(items), MergeMode::Replace) => items,
        (Some(items), MergeMode::Append) => current.iter().cloned().chain(items).collect(),
    };

    Discovered {
        interests: merge(&existing.interests, update.interests),
        strengths: merge(&existing.strengths, update.strengths),
        goals: merge(&existing.goals, update.goals),
    }
}
