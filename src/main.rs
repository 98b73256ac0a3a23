//! phpup - Composer dependency upgrader CLI tool
//!
//! Rewrites the version constraints in a project's composer.json according
//! to an upgrade policy, after checking the proposed set against a dry-run
//! composer resolution.

use clap::Parser;
use phpup::cli::CliArgs;
use phpup::oracle::{HttpClient, PackagistOracle};
use phpup::output::{create_formatter, OutputConfig};
use phpup::progress::Progress;
use phpup::resolver::ComposerCli;
use phpup::session::UpgradeSession;
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("phpup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let oracle = PackagistOracle::new(HttpClient::new()?);
    let session = UpgradeSession::new(&args.path, args.policy(), &oracle);

    // Progress rendering would corrupt machine-read output
    let mut progress = Progress::new(!args.quiet && !args.json);

    let project_dir = args.path.clone();
    let report = session
        .run(&mut progress, move |manifest| {
            Box::new(ComposerCli::new(project_dir, manifest))
        })
        .await?;

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    Ok(if report.state.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
