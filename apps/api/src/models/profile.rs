use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The per-student document. One row in `profiles`, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub questionnaire: Vec<Answer>,
    pub discovered: Discovered,
    pub tracker: Tracker,
    pub college_list: CollegeList,
    pub profile_summary: String,
    pub application_strategies: Option<ApplicationStrategies>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A freshly registered profile: identity only, everything else empty.
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            email,
            name,
            password_hash,
            questionnaire: Vec::new(),
            discovered: Discovered::default(),
            tracker: Tracker::default(),
            college_list: CollegeList::default(),
            profile_summary: String::new(),
            application_strategies: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One questionnaire answer. `question` is snapshotted from the catalog when
/// the answer is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub category: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovered {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
}

/// Progress trackers. Each top-level key is replaced wholesale on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<TestScoreTracker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act: Option<TestScoreTracker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<GpaTracker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitions: Option<Vec<Competition>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestScoreTracker {
    pub current: Option<u32>,
    pub goal: Option<u32>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpaTracker {
    pub current: Option<f64>,
    pub goal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub result: Option<String>,
}

/// College-list classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Reach,
    Target,
    Likely,
}

impl Bucket {
    /// Search order for name lookups and listing order for prompts.
    pub const ALL: [Bucket; 3] = [Bucket::Reach, Bucket::Target, Bucket::Likely];

    /// Case-insensitive tag normalisation. "Safety" is an alias for likely.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "reach" => Some(Bucket::Reach),
            "target" => Some(Bucket::Target),
            "likely" | "safety" => Some(Bucket::Likely),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Reach => "reach",
            Bucket::Target => "target",
            Bucket::Likely => "likely",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Bucket::Reach => "Reach",
            Bucket::Target => "Target",
            Bucket::Likely => "Likely",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub name: String,
    pub category: Bucket,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollegeList {
    #[serde(default)]
    pub reach: Vec<College>,
    #[serde(default)]
    pub target: Vec<College>,
    #[serde(default)]
    pub likely: Vec<College>,
    #[serde(default)]
    pub last_generated: Option<DateTime<Utc>>,
}

impl CollegeList {
    pub fn is_empty(&self) -> bool {
        self.reach.is_empty() && self.target.is_empty() && self.likely.is_empty()
    }

    pub fn bucket(&self, bucket: Bucket) -> &[College] {
        match bucket {
            Bucket::Reach => &self.reach,
            Bucket::Target => &self.target,
            Bucket::Likely => &self.likely,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<College> {
        match bucket {
            Bucket::Reach => &mut self.reach,
            Bucket::Target => &mut self.target,
            Bucket::Likely => &mut self.likely,
        }
    }

    /// First record named `name`, searching reach, then target, then likely.
    pub fn find(&self, name: &str) -> Option<(Bucket, &College)> {
        Bucket::ALL.into_iter().find_map(|bucket| {
            self.bucket(bucket)
                .iter()
                .find(|c| c.name == name)
                .map(|c| (bucket, c))
        })
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut College> {
        let bucket = self.find(name)?.0;
        self.bucket_mut(bucket).iter_mut().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.reach.len() + self.target.len() + self.likely.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStrategies {
    #[serde(default)]
    pub early_decision: Vec<String>,
    #[serde(default)]
    pub early_action: Vec<String>,
    #[serde(default)]
    pub strengths_to_highlight: BTreeMap<String, String>,
}
