//! Change classification.
//!
//! A change is judged by its message first and its paths second. A message
//! containing the success keyword is affirmative, one containing the fail
//! keyword is negative, and only when neither keyword applies are the changed
//! paths run through the include and exclude globs. The change is
//! affirmative when at least one path survives.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::{
    error::GateError,
    types::{ChangeEvent, Decision, FilterConfig},
};

/// Why a [`Verdict`] came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    SuccessKeyword(String),
    FailKeyword(String),
    Paths { matched: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: Reason,
}

/// A [`FilterConfig`] with its globs compiled.
#[derive(Debug, Clone)]
pub struct Classifier {
    includes: Option<GlobSet>,
    excludes: Option<GlobSet>,
    success_keyword: Option<String>,
    fail_keyword: Option<String>,
}

fn non_empty(keyword: &Option<String>) -> Option<String> {
    keyword.as_ref().filter(|k| !k.is_empty()).cloned()
}

// `*` and `?` stay within one path segment while `**` spans directories.
// Leading dots get no special treatment, so `**/*.yml` matches
// `.github/ci.yml`.
fn compile_globs(kind: &str, patterns: &[String]) -> Result<Option<GlobSet>, GateError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|e| GateError::config(format!("invalid {kind} pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| GateError::config(format!("invalid {kind} patterns: {e}")))
}

impl FilterConfig {
    /// Compiles the include and exclude globs.
    ///
    /// Fails with [`GateError::Configuration`] on the first malformed
    /// pattern.
    pub fn compile(&self) -> Result<Classifier, GateError> {
        Ok(Classifier {
            includes: compile_globs("include", &self.includes)?,
            excludes: compile_globs("exclude", &self.excludes)?,
            success_keyword: non_empty(&self.success_keyword),
            fail_keyword: non_empty(&self.fail_keyword),
        })
    }
}

impl Classifier {
    /// Applies the include globs, then the exclude globs, to `paths`.
    ///
    /// Order is preserved. An exclude can only drop a path that the includes
    /// kept.
    pub fn filter<'a>(&self, paths: &'a [String]) -> Vec<&'a str> {
        paths
            .iter()
            .map(String::as_str)
            .filter(|path| self.includes.as_ref().is_none_or(|set| set.is_match(path)))
            .filter(|path| self.excludes.as_ref().is_none_or(|set| !set.is_match(path)))
            .collect()
    }

    pub fn classify(&self, event: &ChangeEvent) -> Verdict {
        if let Some(keyword) = &self.success_keyword
            && event.message.contains(keyword.as_str())
        {
            return Verdict {
                decision: Decision::Affirmative,
                reason: Reason::SuccessKeyword(keyword.clone()),
            };
        }

        if let Some(keyword) = &self.fail_keyword
            && event.message.contains(keyword.as_str())
        {
            return Verdict {
                decision: Decision::Negative,
                reason: Reason::FailKeyword(keyword.clone()),
            };
        }

        let matched: Vec<String> = self
            .filter(&event.paths)
            .into_iter()
            .map(str::to_string)
            .collect();
        debug!(
            changed = event.paths.len(),
            matched = matched.len(),
            "filtered changed paths"
        );

        Verdict {
            decision: Decision::from(!matched.is_empty()),
            reason: Reason::Paths { matched },
        }
    }
}

/// Classifies `event` against `config` in one step.
///
/// Only fails when a glob in `config` is malformed.
pub fn classify(event: &ChangeEvent, config: &FilterConfig) -> Result<Decision, GateError> {
    Ok(config.compile()?.classify(event).decision)
}
