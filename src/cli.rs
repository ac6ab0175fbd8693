use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Release builds are tagged
    if let Some(tag) = option_env!("GH_SELFUPDATE_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("GH_SELFUPDATE_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GH_SELFUPDATE_GIT_BRANCH").unwrap_or("unknown");

    // Formatted once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "gh-selfupdate")]
#[command(about = "Detect and install GitHub Releases of a command")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Plain,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the release that would be installed for this platform
    #[command(
        after_help = "Examples:\n  gh-selfupdate detect cli/cli\n  gh-selfupdate detect nektos/act@v0.2.79 --format json\n  gh-selfupdate detect owner/repo --filter '^tool-core'"
    )]
    Detect {
        /// GitHub repository (e.g., 'owner/repo' or 'owner/repo@vX.Y.Z')
        slug: String,
        /// Output format (json, yaml, plain)
        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
        /// Only consider assets matching this regular expression (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Require a '.sha256' file next to the asset
        #[arg(long)]
        validate: bool,
    },

    /// Replace an executable with a newer release
    Update {
        /// GitHub repository (e.g., 'owner/repo' or 'owner/repo@vX.Y.Z')
        slug: String,
        /// Path of the executable to replace
        #[arg(long)]
        path: PathBuf,
        /// Version currently installed at --path
        #[arg(long)]
        current: String,
        /// Only consider assets matching this regular expression (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Verify the asset against its '.sha256' file
        #[arg(long)]
        validate: bool,
    },

    /// Update gh-selfupdate itself
    SelfUpdate {
        /// Repository gh-selfupdate is released from
        #[arg(long, default_value = "morgaesis/gh-selfupdate")]
        slug: String,
    },

    /// Show the current version
    Version,
}
