//! Error taxonomy for release detection and installation.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single release was passed over during selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipKind {
    Draft,
    Prerelease,
    NoMatchingAsset { os: String, arch: String },
    BadVersion(String),
    /// No release carries the requested tag.
    TagNotFound,
}

/// A release that was considered and rejected, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub tag: String,
    pub kind: SkipKind,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SkipKind::Draft => write!(f, "{}: draft release", self.tag),
            SkipKind::Prerelease => write!(f, "{}: pre-release", self.tag),
            SkipKind::NoMatchingAsset { os, arch } => {
                write!(f, "{}: no asset for {} {}", self.tag, os, arch)
            }
            SkipKind::BadVersion(msg) => write!(f, "{}: {}", self.tag, msg),
            SkipKind::TagNotFound => write!(f, "release {:?} not found", self.tag),
        }
    }
}

fn describe_skipped(skipped: &[SkipReason]) -> String {
    if skipped.is_empty() {
        return "no releases found".to_string();
    }
    skipped
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("repository or release not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("failed to fetch releases for {owner}/{repo}: {reason}")]
    FetchFailed {
        owner: String,
        repo: String,
        reason: String,
    },

    #[error("no suitable release in {owner}/{repo} ({})", describe_skipped(.skipped))]
    NoSuitableRelease {
        owner: String,
        repo: String,
        skipped: Vec<SkipReason>,
    },

    #[error("no version number found in tag {tag:?}")]
    UnparsableVersion { tag: String },

    #[error("invalid semantic version in tag {tag:?}: {source}")]
    InvalidSemver {
        tag: String,
        #[source]
        source: semver::Error,
    },

    #[error("failed finding validation file {name:?}")]
    ValidationAssetMissing { name: String },

    #[error("could not compile regular expression {pattern:?} for filtering releases: {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidEndpointUrl { url: String, reason: String },

    #[error("invalid repository slug {value:?}: {reason}")]
    InvalidSlug { value: String, reason: String },

    #[error("could not load configuration from {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("failed to download asset {asset_id}: {reason}")]
    Download { asset_id: u64, reason: String },

    #[error("validation of {asset} failed: {reason}")]
    ValidationFailed { asset: String, reason: String },

    #[error("failed to decompress {archive}: {reason}")]
    Decompress { archive: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
