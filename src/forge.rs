use async_trait::async_trait;

use crate::types::{CommitDetails, Repo, ReviewState};

/// The source-control host the gate talks to.
///
/// Implementations report unsuccessful API calls as
/// [`GateError::Host`](crate::GateError::Host) wrapped in the returned
/// `anyhow::Error`, so callers can tell host failures apart from everything
/// else.
#[async_trait]
pub trait Forge {
    /// Paths changed between `base` and `head`, in the order the host lists
    /// them.
    async fn compare_commits(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
    ) -> anyhow::Result<Vec<String>>;

    /// Message and changed paths of the commit `reference` resolves to.
    async fn commit(&self, repo: &Repo, reference: &str) -> anyhow::Result<CommitDetails>;

    async fn pull_request_reviews(
        &self,
        repo: &Repo,
        number: u64,
    ) -> anyhow::Result<Vec<ReviewState>>;

    /// Submits an approving review with `body` as its text.
    async fn submit_approval(&self, repo: &Repo, number: u64, body: &str) -> anyhow::Result<()>;
}
