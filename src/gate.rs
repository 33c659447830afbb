use anyhow::Context;
use tracing::{debug, info};

use crate::{
    classify::{Reason, Verdict},
    event::TriggerEvent,
    forge::Forge,
    types::{ChangeEvent, FilterConfig, Repo, ReviewState},
};

pub const DEFAULT_APPROVE_MESSAGE: &str = "Auto approved based on commit conditions";

/// Everything one run needs besides the host connection.
#[derive(Debug, Clone)]
pub struct GateSpec {
    pub repo: Repo,
    pub trigger: TriggerEvent,
    pub filter: FilterConfig,
    /// Review body to approve with, `None` when approval was not requested.
    pub approval: Option<String>,
}

/// The change that was judged and the verdict reached.
#[derive(Debug, Clone)]
pub struct GateResult {
    pub change: ChangeEvent,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    AlreadyApproved,
    Approved,
}

/// Fetches the message and changed paths for the triggering event.
///
/// Pull requests compare base to head and use the PR title, pushes compare
/// the pushed range and use the head commit message, and anything else
/// looks up the single commit the event refers to.
pub async fn change_event<F>(
    forge: &F,
    repo: &Repo,
    trigger: &TriggerEvent,
) -> anyhow::Result<ChangeEvent>
where
    F: Forge + Sync,
{
    let change = match trigger {
        TriggerEvent::PullRequest {
            base_sha,
            head_sha,
            title,
            ..
        } => ChangeEvent::new(
            title.clone(),
            forge.compare_commits(repo, base_sha, head_sha).await?,
        ),
        TriggerEvent::Push {
            before,
            after,
            head_commit_message,
        } => ChangeEvent::new(
            head_commit_message.clone(),
            forge.compare_commits(repo, before, after).await?,
        ),
        TriggerEvent::Other { reference, .. } => {
            let commit = forge.commit(repo, reference).await?;
            ChangeEvent::new(commit.message, commit.paths)
        }
    };

    debug!(message = %change.message, paths = change.paths.len(), "resolved change");
    Ok(change)
}

/// Resolves the change behind the trigger and classifies it.
///
/// Globs are compiled before any request is made, so a bad pattern fails
/// the run without touching the host.
pub async fn evaluate<F>(spec: &GateSpec, forge: &F) -> anyhow::Result<GateResult>
where
    F: Forge + Sync,
{
    let classifier = spec.filter.compile()?;

    let change = change_event(forge, &spec.repo, &spec.trigger)
        .await
        .with_context(|| {
            format!("Failed to resolve the change for '{}' event", spec.trigger.kind())
        })?;

    info!("Changed paths: {:?}", change.paths);

    let verdict = classifier.classify(&change);
    match &verdict.reason {
        Reason::SuccessKeyword(keyword) => info!(
            "Returning {} based on commit message containing '{keyword}'",
            verdict.decision
        ),
        Reason::FailKeyword(keyword) => info!(
            "Returning {} based on commit message containing '{keyword}'",
            verdict.decision
        ),
        Reason::Paths { matched } => {
            info!("Filtered paths: {matched:?}");
            info!("Returning result: {}", verdict.decision);
        }
    }

    Ok(GateResult { change, verdict })
}

/// Approves pull request `number` unless it already carries an approval.
pub async fn approve_pull_request<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    body: &str,
) -> anyhow::Result<ApprovalOutcome>
where
    F: Forge + Sync,
{
    let reviews = forge.pull_request_reviews(repo, number).await?;
    debug!(?reviews, "existing reviews for PR {number}");

    if reviews.contains(&ReviewState::Approved) {
        info!("PR {number} already approved, nothing more to do");
        return Ok(ApprovalOutcome::AlreadyApproved);
    }

    forge.submit_approval(repo, number, body).await?;
    info!("PR {number} auto approved");
    Ok(ApprovalOutcome::Approved)
}

/// Approves the triggering pull request when the run asked for it and the
/// decision was affirmative.
///
/// Returns `None` when nothing was attempted.
pub async fn auto_approve<F>(
    spec: &GateSpec,
    result: &GateResult,
    forge: &F,
) -> anyhow::Result<Option<ApprovalOutcome>>
where
    F: Forge + Sync,
{
    let Some(body) = &spec.approval else {
        return Ok(None);
    };
    if !result.verdict.decision.is_affirmative() {
        return Ok(None);
    }
    let Some(number) = spec.trigger.pull_request_number() else {
        debug!(
            "Approval requested but '{}' is not a pull request event, skipping",
            spec.trigger.kind()
        );
        return Ok(None);
    };

    approve_pull_request(forge, &spec.repo, number, body)
        .await
        .with_context(|| format!("Failed to approve PR {number} in {}", spec.repo))
        .map(Some)
}
