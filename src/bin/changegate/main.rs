use std::io::Write;

use changegate::{GitHub, auto_approve, evaluate, parse_args, publish_decision, report_failure};
use tracing::{error, info, warn};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

// The runner sets RUNNER_DEBUG=1 when a run is re-run with debug logging.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_level = match std::env::var("RUNNER_DEBUG").as_deref() {
        Ok("1") => "debug",
        _ => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run() -> anyhow::Result<()> {
    let invocation = match parse_args(std::env::args()) {
        Ok(invocation) => invocation,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            }
            return Err(err);
        }
    };

    info!("changegate {BUILD_INFO_HUMAN}");
    info!(
        repo = %invocation.spec.repo,
        event = invocation.spec.trigger.kind(),
        includes = ?invocation.spec.filter.includes,
        excludes = ?invocation.spec.filter.excludes,
        approve = invocation.spec.approval.is_some(),
        "evaluating change"
    );

    let github = GitHub::new(&invocation.token, &invocation.api_url)?;
    let result = evaluate(&invocation.spec, &github).await?;

    publish_decision(&invocation.output, result.verdict.decision)?;

    auto_approve(&invocation.spec, &result, &github).await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!("{err:#}");
        let mut stdout = std::io::stdout();
        if let Err(write_err) = report_failure(&mut stdout, &err).and_then(|()| stdout.flush()) {
            warn!("Failed to write error annotation: {write_err}");
        }
        std::process::exit(1);
    }
}
