//! Reporting back to the workflow runner.
//!
//! Step outputs are appended as `key=value` lines to the file named by
//! `GITHUB_OUTPUT`. Failures are surfaced as `::error::` workflow commands
//! on stdout, which the runner turns into annotations on the run.

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::types::Decision;

/// The output key the decision is published under.
pub const OUTPUT_KEY: &str = "result";

/// Where step outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// The runner's `GITHUB_OUTPUT` file.
    File(PathBuf),
    /// Standard output, for runs outside GitHub Actions.
    Stdout,
}

impl OutputTarget {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.filter(|p| !p.as_os_str().is_empty())
            .map_or(OutputTarget::Stdout, OutputTarget::File)
    }
}

pub fn write_output<W: Write>(writer: &mut W, key: &str, value: &str) -> io::Result<()> {
    writeln!(writer, "{key}={value}")
}

fn append_output(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file '{}'", path.display()))?;
    write_output(&mut file, key, value)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

/// Publishes `decision` under [`OUTPUT_KEY`].
pub fn publish_decision(target: &OutputTarget, decision: Decision) -> Result<()> {
    match target {
        OutputTarget::File(path) => append_output(path, OUTPUT_KEY, decision.as_str()),
        OutputTarget::Stdout => {
            write_output(&mut io::stdout().lock(), OUTPUT_KEY, decision.as_str())
                .context("Failed to write output to stdout")
        }
    }
}

// Workflow command data is terminated by a newline, so `%`, CR and LF are
// percent-encoded.
fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Writes an `::error::` workflow command carrying the full error chain.
pub fn report_failure<W: Write>(writer: &mut W, err: &anyhow::Error) -> io::Result<()> {
    writeln!(writer, "::error::{}", escape_command_data(&format!("{err:#}")))
}
