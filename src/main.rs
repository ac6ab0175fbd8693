mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use console::style;
use gh_selfupdate::{parse_version, Config, Release, Sha256Validator, Slug, Updater};
use semver::Version;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    match cli.command {
        Commands::Version => {
            println!("gh-selfupdate v{}", env!("CARGO_PKG_VERSION"));
        }

        Commands::Detect {
            slug,
            format,
            filters,
            validate,
        } => {
            let slug = parse_slug(&slug)?;
            let updater = build_updater(filters, validate, false)?;
            let release = updater
                .detect_version(&slug.owner, &slug.name, slug.version())
                .await
                .with_context(|| format!("Could not detect a release of {}", slug))?;
            print_release(&release, format)?;
        }

        Commands::Update {
            slug,
            path,
            current,
            filters,
            validate,
        } => {
            let slug = parse_slug(&slug)?;
            let current = parse_version(&current)
                .map_err(|e| anyhow!("Invalid --current version: {}", e))?;
            let updater = build_updater(filters, validate, !cli.quiet)?;

            if slug.tag.is_some() {
                let release = updater
                    .detect_version(&slug.owner, &slug.name, slug.version())
                    .await?;
                if release.version() == &current {
                    println!("Already at {}", style(&current).green());
                } else {
                    updater.update_to(&release, &path).await?;
                    println!(
                        "Installed {} at {}",
                        style(release.version()).green().bold(),
                        path.display()
                    );
                }
            } else {
                let release = updater
                    .update_command(&path, &current, &slug.owner, &slug.name)
                    .await?;
                report_update(&current, &release);
            }
        }

        Commands::SelfUpdate { slug } => {
            let slug = parse_slug(&slug)?;
            let current = Version::parse(env!("CARGO_PKG_VERSION"))?;
            let updater = build_updater(Vec::new(), false, !cli.quiet)?;
            let release = updater
                .update_self(&current, &slug.owner, &slug.name)
                .await
                .context("Self-update failed")?;
            report_update(&current, &release);
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn parse_slug(value: &str) -> Result<Slug> {
    Slug::parse(value).map_err(|e| anyhow!("Invalid repository: {}", e))
}

fn build_updater(filters: Vec<String>, validate: bool, show_progress: bool) -> Result<Updater> {
    let mut config = Config::discover()?;
    if !filters.is_empty() {
        config.filters = filters;
    }
    config.show_progress = show_progress;
    if validate {
        config = config.with_validator(Sha256Validator);
    }
    tracing::debug!("Using configuration: {:?}", config);
    Ok(Updater::new(config)?)
}

fn print_release(release: &Release, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(release)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(release)?),
        OutputFormat::Plain => {
            println!(
                "{}/{} {}",
                release.repo_owner(),
                release.repo_name(),
                style(release.version()).green().bold()
            );
            println!("  Asset:     {}", release.asset_name());
            println!("  Size:      {} bytes", release.asset_byte_size());
            println!("  Download:  {}", release.asset_url());
            if let Some(published) = release.published_at() {
                println!("  Published: {}", published.to_rfc3339());
            }
            println!("  Release:   {}", style(release.url()).dim());
        }
    }
    Ok(())
}

fn report_update(current: &Version, release: &Release) {
    if release.version() == current {
        println!("Already up to date ({})", style(current).green());
    } else if release.version() < current {
        println!(
            "Installed {} is newer than release {}",
            current,
            release.version()
        );
    } else {
        println!(
            "Updated {} -> {}",
            current,
            style(release.version()).green().bold()
        );
        if !release.release_notes().is_empty() {
            println!("\n{}", release.release_notes());
        }
    }
}
