//! CLI argument parsing module for phpup

use crate::domain::Stability;
use crate::policy::UpgradePolicy;
use clap::Parser;
use std::path::PathBuf;

/// Composer dependency upgrader
#[derive(Parser, Debug, Clone)]
#[command(name = "phpup", version, about = "Composer dependency upgrader")]
pub struct CliArgs {
    /// Project directory containing composer.json (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Dry run mode - compute and report updates without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    // Upgrade magnitude; the highest named flag wins
    /// Allow major version upgrades (implies minor and patch)
    #[arg(long)]
    pub major: bool,

    /// Allow minor and patch upgrades (the default)
    #[arg(long)]
    pub minor: bool,

    /// Allow patch upgrades only
    #[arg(long)]
    pub patch: bool,

    /// Lowest acceptable stability for upgrade targets
    #[arg(long, value_enum, default_value_t = Stability::Stable)]
    pub stability: Stability,

    /// Evaluate only these packages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Build the upgrade policy these flags describe
    pub fn policy(&self) -> UpgradePolicy {
        let (allow_major, allow_minor, allow_patch) = if self.major {
            (true, true, true)
        } else if self.minor {
            (false, true, true)
        } else if self.patch {
            (false, false, true)
        } else {
            (false, true, true)
        };

        UpgradePolicy::new()
            .with_major(allow_major)
            .with_minor(allow_minor)
            .with_patch(allow_patch)
            .with_min_stability(self.stability)
            .with_only(self.only.clone())
            .with_dry_run(self.dry_run)
    }
}
