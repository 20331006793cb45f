/// Workflow Client: the single point of entry for all AI workflow calls.
///
/// ARCHITECTURAL RULE: No other module may call the workflow service directly.
/// Every call site goes through the `Workflow` trait so tests can script it.
///
/// Calls are blocking-mode round trips with no retries: a failed run is
/// reported to the caller immediately.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

const RUN_PATH: &str = "/workflows/run";
const SNIPPET_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Workflow run {status}: {message}")]
    RunFailed { status: String, message: String },

    #[error("Workflow output '{field}' is missing or not a string")]
    MissingOutput { field: String },

    #[error("Workflow output '{field}' did not match the expected schema ({source}) near: {snippet}")]
    Parse {
        field: String,
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The four workflows the service exposes. Each has its own credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    Summary,
    CollegeList,
    WhyReasons,
    Strategies,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Summary => "summary",
            WorkflowKind::CollegeList => "college_list",
            WorkflowKind::WhyReasons => "why_reasons",
            WorkflowKind::Strategies => "strategies",
        }
    }
}

/// API keys per workflow.
#[derive(Debug, Clone)]
pub struct WorkflowKeys {
    pub summary: String,
    pub college_list: String,
    pub why_reasons: String,
    pub strategies: String,
}

impl WorkflowKeys {
    fn for_kind(&self, kind: WorkflowKind) -> &str {
        match kind {
            WorkflowKind::Summary => &self.summary,
            WorkflowKind::CollegeList => &self.college_list,
            WorkflowKind::WhyReasons => &self.why_reasons,
            WorkflowKind::Strategies => &self.strategies,
        }
    }
}

/// The `outputs` mapping of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkflowOutputs(pub HashMap<String, Value>);

impl WorkflowOutputs {
    /// Builds outputs from string pairs.
    #[cfg(test)]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }

    /// A string-valued output.
    pub fn text(&self, field: &str) -> Result<&str, WorkflowError> {
        self.0
            .get(field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| WorkflowError::MissingOutput {
                field: field.to_string(),
            })
    }

    /// A structured output. String outputs are parsed as JSON (markdown fences
    /// tolerated); structured outputs are deserialized as-is.
    pub fn json<T: DeserializeOwned>(&self, field: &str) -> Result<T, WorkflowError> {
        let value = self
            .0
            .get(field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| WorkflowError::MissingOutput {
                field: field.to_string(),
            })?;

        match value {
            Value::String(raw) => {
                let text = strip_json_fences(raw);
                serde_json::from_str(text).map_err(|source| WorkflowError::Parse {
                    field: field.to_string(),
                    snippet: snippet(text),
                    source,
                })
            }
            other => serde_json::from_value(other.clone()).map_err(|source| {
                WorkflowError::Parse {
                    field: field.to_string(),
                    snippet: snippet(&other.to_string()),
                    source,
                }
            }),
        }
    }
}

/// The AI workflow collaborator.
#[async_trait]
pub trait Workflow: Send + Sync {
    async fn run(
        &self,
        kind: WorkflowKind,
        inputs: HashMap<String, String>,
        user: &str,
    ) -> Result<WorkflowOutputs, WorkflowError>;
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    inputs: &'a HashMap<String, String>,
    response_mode: &'a str,
    user: &'a str,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    workflow_run_id: Option<String>,
    data: RunData,
}

#[derive(Debug, Deserialize)]
struct RunData {
    status: String,
    #[serde(default)]
    outputs: Option<WorkflowOutputs>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP implementation of `Workflow`.
#[derive(Clone)]
pub struct WorkflowClient {
    client: Client,
    base_url: String,
    keys: WorkflowKeys,
}

impl WorkflowClient {
    pub fn new(
        base_url: String,
        keys: WorkflowKeys,
        timeout: Duration,
    ) -> Result<Self, WorkflowError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            keys,
        })
    }

    fn run_url(&self) -> String {
        format!("{}{}", self.base_url, RUN_PATH)
    }
}

#[async_trait]
impl Workflow for WorkflowClient {
    async fn run(
        &self,
        kind: WorkflowKind,
        inputs: HashMap<String, String>,
        user: &str,
    ) -> Result<WorkflowOutputs, WorkflowError> {
        info!(workflow = kind.as_str(), user, "Invoking workflow");

        let request_body = RunRequest {
            inputs: &inputs,
            response_mode: "blocking",
            user,
        };

        let response = self
            .client
            .post(self.run_url())
            .bearer_auth(self.keys.for_kind(kind))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(WorkflowError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let run: RunResponse = response.json().await?;
        debug!(
            workflow = kind.as_str(),
            run_id = run.workflow_run_id.as_deref().unwrap_or("-"),
            "Workflow run finished with status {}",
            run.data.status
        );

        if run.data.status != "succeeded" {
            return Err(WorkflowError::RunFailed {
                status: run.data.status,
                message: run.data.error.unwrap_or_default(),
            });
        }

        Ok(run.data.outputs.unwrap_or_default())
    }
}

/// Builds an `inputs` map from string pairs.
pub fn inputs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn snippet(text: &str) -> String {
    let mut s: String = text.chars().take(SNIPPET_CHARS).collect();
    if text.chars().count() > SNIPPET_CHARS {
        s.push_str("...");
    }
    s
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
