use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};
use url::Url;

use crate::{
    error::GateError,
    event::TriggerEvent,
    gate::{DEFAULT_APPROVE_MESSAGE, GateSpec},
    github::DEFAULT_API_URL,
    output::OutputTarget,
    types::{FilterConfig, Repo},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Action inputs. GitHub exposes input `foo` as `INPUT_FOO`, keeping
/// hyphens and upper-casing the name.
#[derive(Args, Debug, Clone, Default)]
struct InputArgs {
    /// Token used to call the GitHub API
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Pass when the commit message contains this text
    #[arg(
        long = "success-commit-message",
        env = "INPUT_SUCCESS-COMMIT-MESSAGE",
        value_name = "TEXT"
    )]
    pub success_commit_message: Option<String>,

    /// Fail when the commit message contains this text
    #[arg(
        long = "fail-commit-message",
        env = "INPUT_FAIL-COMMIT-MESSAGE",
        value_name = "TEXT"
    )]
    pub fail_commit_message: Option<String>,

    /// Only consider changed paths matching one of these globs (comma-separated)
    #[arg(long, env = "INPUT_INCLUDES", value_delimiter = ',', value_name = "GLOB")]
    pub includes: Vec<String>,

    /// Ignore changed paths matching any of these globs (comma-separated)
    #[arg(long, env = "INPUT_EXCLUDES", value_delimiter = ',', value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Approve the pull request when the result is true (true/false)
    #[arg(long, env = "INPUT_APPROVE", value_name = "BOOL")]
    pub approve: Option<String>,

    /// Review body used when approving
    #[arg(long = "approve-message", env = "INPUT_APPROVEMESSAGE", value_name = "TEXT")]
    pub approve_message: Option<String>,
}

/// Workflow run context, provided by the runner as `GITHUB_*` variables.
#[derive(Args, Debug, Clone, Default)]
struct RunnerArgs {
    /// Repository the workflow runs in
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Name of the event that triggered the workflow
    #[arg(long = "event-name", env = "GITHUB_EVENT_NAME", value_name = "NAME")]
    pub event_name: Option<String>,

    /// Path to the JSON webhook payload of the triggering event
    #[arg(long = "event-path", env = "GITHUB_EVENT_PATH", value_name = "PATH")]
    pub event_path: Option<PathBuf>,

    /// Commit SHA of the run, used when the payload carries no ref
    #[arg(long, env = "GITHUB_SHA", value_name = "SHA")]
    pub sha: Option<String>,

    /// File step outputs are appended to (stdout when unset)
    #[arg(long = "output-file", env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// GitHub REST API base URL
    #[arg(
        long = "api-url",
        env = "GITHUB_API_URL",
        default_value = DEFAULT_API_URL,
        value_name = "URL"
    )]
    pub api_url: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "changegate",
    about = "Decide whether a change matters from its commit message and changed paths, and optionally approve the pull request"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub runner: RunnerArgs,
}

/// A fully validated invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub spec: GateSpec,
    pub token: String,
    pub api_url: Url,
    pub output: OutputTarget,
}

fn required(value: Option<String>, name: &str) -> Result<String, GateError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GateError::config(format!("Input required and not supplied: {name}")))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_patterns(patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Interprets a boolean-ish input. Unset and empty both mean `false`.
pub fn parse_flag(name: &str, value: Option<&str>) -> Result<bool, GateError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "no" | "n" | "off" | "0" | "" => Ok(false),
        _ => Err(GateError::config(format!(
            "Input '{name}' must be a boolean (true/false), got: '{value}'"
        ))),
    }
}

fn parse_api_url(raw: &str) -> Result<Url, GateError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| GateError::config(format!("Invalid API URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GateError::config(format!(
            "API URL must use http or https, got: '{raw}'"
        )));
    }
    Ok(url)
}

impl CliArgs {
    fn into_invocation(self) -> Result<Invocation> {
        let CliArgs { inputs, runner } = self;

        let token = required(inputs.token, "token")?;

        let repo = required(runner.repository, "repository")?;
        let repo = Repo::parse(&repo).map_err(|e| GateError::config(e.to_string()))?;

        let event_name = required(runner.event_name, "event-name")?;
        let event_path = runner
            .event_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| GateError::config("Input required and not supplied: event-path"))?;
        let sha = optional(runner.sha);
        let trigger = TriggerEvent::load(&event_name, &event_path, sha.as_deref())?;

        let approval = parse_flag("approve", inputs.approve.as_deref())?.then(|| {
            optional(inputs.approve_message)
                .unwrap_or_else(|| DEFAULT_APPROVE_MESSAGE.to_string())
        });

        let filter = FilterConfig {
            includes: clean_patterns(inputs.includes),
            excludes: clean_patterns(inputs.excludes),
            success_keyword: optional(inputs.success_commit_message),
            fail_keyword: optional(inputs.fail_commit_message),
        };

        Ok(Invocation {
            spec: GateSpec {
                repo,
                trigger,
                filter,
                approval,
            },
            token,
            api_url: parse_api_url(&runner.api_url)?,
            output: OutputTarget::from_path(runner.output_file),
        })
    }
}

/// Parses command-line arguments, falling back to the Actions environment,
/// into a validated [`Invocation`].
///
/// Reads the event payload file, so a missing or malformed payload is
/// reported here as a configuration error.
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    cli.into_invocation()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("approve", None).unwrap());
        assert!(!parse_flag("approve", Some("")).unwrap());
        assert!(parse_flag("approve", Some("true")).unwrap());
        assert!(parse_flag("approve", Some(" TRUE ")).unwrap());
        assert!(parse_flag("approve", Some("yes")).unwrap());
        assert!(!parse_flag("approve", Some("false")).unwrap());
        assert!(!parse_flag("approve", Some("0")).unwrap());

        let err = parse_flag("approve", Some("sometimes")).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn test_clean_patterns_trims_and_drops_empties() {
        let patterns = vec![
            "src/**".to_string(),
            " docs/** ".to_string(),
            String::new(),
            "  ".to_string(),
        ];
        assert_eq!(clean_patterns(patterns), vec!["src/**", "docs/**"]);
    }

    #[test]
    fn test_parse_api_url() {
        assert_eq!(
            parse_api_url("https://ghe.example.com/api/v3").unwrap().as_str(),
            "https://ghe.example.com/api/v3"
        );
        assert!(parse_api_url("not a url").unwrap_err().is_configuration());
        assert!(parse_api_url("ftp://example.com").unwrap_err().is_configuration());
    }
}
