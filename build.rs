//! Build script for changegate - embeds version information.
//!
//! `BUILD_INFO_HUMAN` is shown by `changegate --version` and logged at the
//! start of every run. It is assembled from:
//!
//! - the crate version,
//! - `git describe --tags --always --dirty` unless it only yields a bare
//!   commit hash, in which case `g<commit>-<commit date>`; a build outside
//!   a checkout falls back to the build date,
//! - the rustc version.

use std::{env, process::Command};

use chrono::{DateTime, Utc};

fn main() {
    ["src", "build.rs", "Cargo.toml", "Cargo.lock"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

fn source_revision() -> String {
    if let Some(described) = run("git", &["describe", "--tags", "--always", "--dirty"])
        && !described.chars().all(|c| c.is_ascii_hexdigit())
    {
        return described;
    }

    match run("git", &["rev-parse", "--short=12", "HEAD"]) {
        Some(commit) => {
            let committed = run("git", &["log", "-1", "--format=%ct"])
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .unwrap_or_else(Utc::now);
            format!("g{commit}-{}", stamp(committed))
        }
        None => format!("built-{}", stamp(Utc::now())),
    }
}

fn build_info() -> String {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();

    [
        Some(version),
        Some(format!("({})", source_revision())),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
