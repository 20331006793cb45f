// Recommendation Orchestrator: college list, per-school reasons, and
// application strategies. Each reads the cached profile summary.
// All workflow calls go through workflow_client.

pub mod college_list;
pub mod handlers;
pub mod strategies;
pub mod why_reasons;
