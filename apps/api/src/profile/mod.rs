// Profile core: question catalog, merge policies, summary generation,
// accounts, and the update pipeline that ties them together.
// All workflow calls go through workflow_client.

pub mod account;
pub mod catalog;
pub mod handlers;
pub mod merge;
pub mod summary;
pub mod updates;
