use std::sync::Arc;

use crate::config::Config;
use crate::store::ProfileStore;
use crate::workflow_client::Workflow;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Profile persistence. Default: PgProfileStore.
    pub store: Arc<dyn ProfileStore>,
    /// AI workflow service. Default: WorkflowClient.
    pub workflow: Arc<dyn Workflow>,
    pub config: Config,
}
