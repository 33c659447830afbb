//! Changegate: commit-condition gate for GitHub Actions workflows.
//!
//! Decides whether a change is relevant from its commit or pull request
//! message and the paths it touched. A configured success or fail keyword in
//! the message settles the question outright. Otherwise the changed paths
//! are filtered through include and exclude globs, and the change counts when
//! any path survives. The decision is published as a `"true"`/`"false"` step
//! output, and an affirmative pull request can be approved automatically.

pub mod classify;
pub mod cli;
pub mod error;
pub mod event;
pub mod forge;
pub mod gate;
pub mod github;
pub mod output;
pub mod types;

pub use classify::{Classifier, Reason, Verdict, classify};
pub use cli::{Invocation, parse_args};
pub use error::GateError;
pub use event::TriggerEvent;
pub use forge::Forge;
pub use gate::{
    ApprovalOutcome, DEFAULT_APPROVE_MESSAGE, GateResult, GateSpec, approve_pull_request,
    auto_approve, change_event, evaluate,
};
pub use github::GitHub;
pub use output::{OUTPUT_KEY, OutputTarget, publish_decision, report_failure};
pub use types::{ChangeEvent, CommitDetails, Decision, FilterConfig, Repo, RepoError, ReviewState};
