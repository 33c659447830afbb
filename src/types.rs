use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Commit or pull request message plus the paths it touched.
///
/// Built once per run from the triggering event and never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    pub message: String,
    pub paths: Vec<String>,
}

impl ChangeEvent {
    pub fn new(message: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            message: message.into(),
            paths,
        }
    }
}

/// Keyword and glob settings that drive classification.
///
/// Empty keywords are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub success_keyword: Option<String>,
    pub fail_keyword: Option<String>,
}

/// Outcome of a run, published as the literal `"true"` or `"false"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Affirmative,
    Negative,
}

impl Decision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Affirmative => "true",
            Decision::Negative => "false",
        }
    }

    pub const fn is_affirmative(self) -> bool {
        matches!(self, Decision::Affirmative)
    }
}

impl From<bool> for Decision {
    fn from(value: bool) -> Self {
        if value {
            Decision::Affirmative
        } else {
            Decision::Negative
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single pull request review as reported by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    #[serde(other)]
    Unknown,
}

/// Message and changed paths of a single commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDetails {
    pub message: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    Format(String),
    #[error("repository owner must not be empty")]
    EmptyOwner,
    #[error("repository name must not be empty")]
    EmptyName,
}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into().trim().to_string();
        let name = name.into().trim().to_string();
        if owner.is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.is_empty() {
            return Err(RepoError::EmptyName);
        }
        Ok(Self { owner, name })
    }

    /// Parses the `owner/repo` slug found in `GITHUB_REPOSITORY`.
    pub fn parse(slug: &str) -> Result<Self, RepoError> {
        let slug = slug.trim();
        match slug.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] => Self::new(*owner, *name),
            _ => Err(RepoError::Format(slug.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
