//! Self-update an executable from GitHub Releases.
//!
//! An [`Updater`] lists the releases of a repository, picks the newest one
//! carrying an asset for the running platform, and can swap that asset in for
//! an executable on disk:
//!
//! ```no_run
//! # async fn run() -> gh_selfupdate::Result<()> {
//! use gh_selfupdate::{Config, Updater};
//!
//! let updater = Updater::new(Config::default())?;
//! let release = updater.detect_latest("owner", "tool").await?;
//! println!("{} at {}", release.version(), release.asset_url());
//! # Ok(())
//! # }
//! ```
//!
//! Assets are expected to be named `<cmd>_<os>_<arch>[.ext]`, for example
//! `tool_linux_amd64.tar.gz` or `tool_windows_amd64.exe.zip`.

pub mod config;
pub mod decompress;
pub mod error;
pub mod install;
pub mod matcher;
pub mod platform;
pub mod select;
pub mod slug;
pub mod source;
pub mod types;
pub mod updater;
pub mod validate;
pub mod version;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{Error, Result, SkipKind, SkipReason};
pub use matcher::{AssetFilter, AssetMatcher};
pub use platform::{Arch, Os, Platform};
pub use slug::Slug;
pub use source::{GitHubClient, ReleaseSource, SourceError};
pub use types::{RawAsset, RawRelease, Release};
pub use updater::{default_updater, Updater};
pub use validate::{Sha256Validator, Validator};
pub use version::parse_version;

use semver::Version;

/// Latest release of `owner/repo` using the [`default_updater`].
pub async fn detect_latest(owner: &str, repo: &str) -> Result<Release> {
    default_updater()?.detect_latest(owner, repo).await
}

/// Release of `owner/repo` tagged `version` using the [`default_updater`].
pub async fn detect_version(owner: &str, repo: &str, version: &str) -> Result<Release> {
    default_updater()?.detect_version(owner, repo, version).await
}

/// Update the running executable using the [`default_updater`].
pub async fn update_self(current: &Version, owner: &str, repo: &str) -> Result<Release> {
    default_updater()?.update_self(current, owner, repo).await
}
