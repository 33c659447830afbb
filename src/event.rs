//! The workflow event that triggered the run.
//!
//! GitHub Actions names the event in `GITHUB_EVENT_NAME` and writes its
//! webhook payload to the file at `GITHUB_EVENT_PATH`. Only the handful of
//! fields needed to find the change message and the compared commits are
//! read; everything else in the payload is ignored.

use std::path::Path;

use serde::Deserialize;

use crate::error::GateError;

pub const PULL_REQUEST_EVENT: &str = "pull_request";
pub const PUSH_EVENT: &str = "push";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// The change is the diff between the PR's base and head commits and its
    /// message is the PR title.
    PullRequest {
        number: u64,
        base_sha: String,
        head_sha: String,
        title: String,
    },
    /// The change is the pushed range. `head_commit_message` is empty when
    /// the push carries no head commit, e.g. a branch deletion.
    Push {
        before: String,
        after: String,
        head_commit_message: String,
    },
    /// Any other event (`workflow_dispatch`, `schedule`, ...). The change is
    /// the single commit `reference` resolves to.
    Other { kind: String, reference: String },
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    pull_request: PullRequestBody,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    number: u64,
    #[serde(default)]
    title: String,
    base: CommitPointer,
    head: CommitPointer,
}

#[derive(Debug, Deserialize)]
struct CommitPointer {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    before: String,
    after: String,
    #[serde(default)]
    head_commit: Option<HeadCommit>,
}

#[derive(Debug, Deserialize)]
struct HeadCommit {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct OtherPayload {
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

fn invalid_payload(kind: &str, err: serde_json::Error) -> GateError {
    GateError::config(format!("invalid '{kind}' event payload: {err}"))
}

impl TriggerEvent {
    /// Builds the event from its name and raw JSON payload.
    ///
    /// `fallback_ref` is used for events whose payload carries no `ref`
    /// (GitHub passes the run's commit as `GITHUB_SHA`).
    pub fn from_payload(
        kind: &str,
        payload: &str,
        fallback_ref: Option<&str>,
    ) -> Result<Self, GateError> {
        match kind {
            PULL_REQUEST_EVENT => {
                let payload: PullRequestPayload =
                    serde_json::from_str(payload).map_err(|e| invalid_payload(kind, e))?;
                let pr = payload.pull_request;
                Ok(TriggerEvent::PullRequest {
                    number: pr.number,
                    base_sha: pr.base.sha,
                    head_sha: pr.head.sha,
                    title: pr.title,
                })
            }
            PUSH_EVENT => {
                let payload: PushPayload =
                    serde_json::from_str(payload).map_err(|e| invalid_payload(kind, e))?;
                Ok(TriggerEvent::Push {
                    before: payload.before,
                    after: payload.after,
                    head_commit_message: payload
                        .head_commit
                        .map(|commit| commit.message)
                        .unwrap_or_default(),
                })
            }
            _ => {
                let payload: OtherPayload = if payload.trim().is_empty() {
                    OtherPayload::default()
                } else {
                    serde_json::from_str(payload).map_err(|e| invalid_payload(kind, e))?
                };
                let reference = payload
                    .reference
                    .filter(|r| !r.is_empty())
                    .or_else(|| fallback_ref.map(str::to_string))
                    .ok_or_else(|| {
                        GateError::config(format!(
                            "'{kind}' event payload has no 'ref' and no commit SHA was supplied"
                        ))
                    })?;
                Ok(TriggerEvent::Other {
                    kind: kind.to_string(),
                    reference,
                })
            }
        }
    }

    /// Reads the payload file written by the runner and builds the event.
    pub fn load(kind: &str, path: &Path, fallback_ref: Option<&str>) -> Result<Self, GateError> {
        let payload = std::fs::read_to_string(path).map_err(|e| {
            GateError::config(format!(
                "failed to read event payload '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_payload(kind, &payload, fallback_ref)
    }

    pub fn kind(&self) -> &str {
        match self {
            TriggerEvent::PullRequest { .. } => PULL_REQUEST_EVENT,
            TriggerEvent::Push { .. } => PUSH_EVENT,
            TriggerEvent::Other { kind, .. } => kind,
        }
    }

    pub fn pull_request_number(&self) -> Option<u64> {
        match self {
            TriggerEvent::PullRequest { number, .. } => Some(*number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_payload() {
        let payload = r#"{
            "action": "synchronize",
            "number": 42,
            "pull_request": {
                "number": 42,
                "title": "docs: fix typo",
                "base": { "ref": "main", "sha": "1111111" },
                "head": { "ref": "typo", "sha": "2222222" }
            }
        }"#;

        let event = TriggerEvent::from_payload("pull_request", payload, None).unwrap();
        assert_eq!(
            event,
            TriggerEvent::PullRequest {
                number: 42,
                base_sha: "1111111".to_string(),
                head_sha: "2222222".to_string(),
                title: "docs: fix typo".to_string(),
            }
        );
        assert_eq!(event.kind(), "pull_request");
        assert_eq!(event.pull_request_number(), Some(42));
    }

    #[test]
    fn test_push_payload_without_head_commit() {
        let payload = r#"{ "before": "aaaa", "after": "0000", "head_commit": null }"#;

        let event = TriggerEvent::from_payload("push", payload, None).unwrap();
        assert_eq!(
            event,
            TriggerEvent::Push {
                before: "aaaa".to_string(),
                after: "0000".to_string(),
                head_commit_message: String::new(),
            }
        );
        assert_eq!(event.pull_request_number(), None);
    }

    #[test]
    fn test_other_event_prefers_payload_ref() {
        let payload = r#"{ "ref": "refs/heads/main", "inputs": {} }"#;

        let event =
            TriggerEvent::from_payload("workflow_dispatch", payload, Some("abcdef")).unwrap();
        assert_eq!(
            event,
            TriggerEvent::Other {
                kind: "workflow_dispatch".to_string(),
                reference: "refs/heads/main".to_string(),
            }
        );
        assert_eq!(event.kind(), "workflow_dispatch");
    }

    #[test]
    fn test_other_event_falls_back_to_sha() {
        let event = TriggerEvent::from_payload(
            "schedule",
            r#"{"schedule": "0 0 * * *"}"#,
            Some("abcdef"),
        )
        .unwrap();
        assert_eq!(
            event,
            TriggerEvent::Other {
                kind: "schedule".to_string(),
                reference: "abcdef".to_string(),
            }
        );
    }

    #[test]
    fn test_other_event_without_any_ref_is_rejected() {
        let err = TriggerEvent::from_payload("schedule", "{}", None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_pull_request_payload_missing_fields_is_rejected() {
        let err = TriggerEvent::from_payload("pull_request", r#"{"pull_request": {}}"#, None)
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("pull_request"));
    }
}
