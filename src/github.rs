use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    error::GateError,
    forge::Forge,
    types::{CommitDetails, Repo, ReviewState},
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct ChangedFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct Comparison {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Commit {
    commit: CommitBody,
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Debug, Deserialize)]
struct Review {
    state: ReviewState,
}

#[derive(Debug, Serialize)]
struct ReviewRequest<'a> {
    body: &'a str,
    event: &'static str,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
}

fn filenames(files: Vec<ChangedFile>) -> Vec<String> {
    files.into_iter().map(|f| f.filename).collect()
}

// The commits endpoint takes `heads/main` or `tags/v1` style references;
// dispatch payloads carry the fully qualified `refs/heads/main`.
fn commit_ref(reference: &str) -> &str {
    reference.strip_prefix("refs/").unwrap_or(reference)
}

/// GitHub REST API client.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    /// Creates an authenticated client for the API at `api_url`.
    ///
    /// Failed calls are never retried.
    pub fn new(token: &str, api_url: &Url) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .add_retry_config(RetryConfig::None)
            .base_uri(api_url.as_str())
            .with_context(|| format!("Invalid GitHub API URL: '{api_url}'"))?
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }

    fn route(repo: &Repo, rest: &str) -> String {
        format!("/repos/{}/{}/{rest}", repo.owner(), repo.name())
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn compare_commits(&self, repo: &Repo, base: &str, head: &str) -> Result<Vec<String>> {
        let route = Self::route(repo, &format!("compare/{base}...{head}"));
        debug!(%route, "comparing commits");

        let comparison: Comparison = self
            .client
            .get(&route, None::<&()>)
            .await
            .map_err(|e| GateError::host("compare commits", e))?;

        Ok(filenames(comparison.files))
    }

    async fn commit(&self, repo: &Repo, reference: &str) -> Result<CommitDetails> {
        let route = Self::route(repo, &format!("commits/{}", commit_ref(reference)));
        debug!(%route, "fetching commit");

        let commit: Commit = self
            .client
            .get(&route, None::<&()>)
            .await
            .map_err(|e| GateError::host("get commit", e))?;

        Ok(CommitDetails {
            message: commit.commit.message,
            paths: filenames(commit.files),
        })
    }

    async fn pull_request_reviews(&self, repo: &Repo, number: u64) -> Result<Vec<ReviewState>> {
        let route = Self::route(repo, &format!("pulls/{number}/reviews"));
        debug!(%route, "listing reviews");

        let reviews: Vec<Review> = self
            .client
            .get(&route, Some(&PageParams { per_page: 100 }))
            .await
            .map_err(|e| GateError::host("list reviews", e))?;

        Ok(reviews.into_iter().map(|r| r.state).collect())
    }

    async fn submit_approval(&self, repo: &Repo, number: u64, body: &str) -> Result<()> {
        let route = Self::route(repo, &format!("pulls/{number}/reviews"));
        debug!(%route, "submitting approval");

        let request = ReviewRequest {
            body,
            event: "APPROVE",
        };
        let _created: serde_json::Value = self
            .client
            .post(&route, Some(&request))
            .await
            .map_err(|e| GateError::host("create review", e))?;

        Ok(())
    }
}
