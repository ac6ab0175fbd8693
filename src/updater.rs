//! The [`Updater`] and release detection.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::matcher::{AssetFilter, AssetMatcher};
use crate::platform::Platform;
use crate::select::select_release;
use crate::source::{GitHubClient, ReleaseSource, SourceError};
use crate::types::Release;
use crate::validate::Validator;
use std::sync::{Arc, OnceLock};

/// Detects and installs releases of a repository.
///
/// Configuration is fixed at construction; detection calls take `&self` and
/// may run concurrently.
pub struct Updater<S = GitHubClient> {
    pub(crate) source: S,
    pub(crate) filter: AssetFilter,
    pub(crate) validator: Option<Arc<dyn Validator>>,
    pub(crate) platform: Platform,
}

impl Updater<GitHubClient> {
    /// Build an updater talking to github.com, or to GitHub Enterprise when
    /// `enterprise_base_url` is set.
    pub fn new(config: Config) -> Result<Self> {
        let token = config.api_token.as_deref();
        let source = match config.enterprise_base_url.as_deref() {
            Some(base) if !base.is_empty() => {
                GitHubClient::enterprise(base, config.enterprise_upload_url.as_deref(), token)?
            }
            _ => GitHubClient::new(token)?,
        }
        .with_progress(config.show_progress);
        Self::with_source(source, config)
    }
}

impl<S: ReleaseSource> Updater<S> {
    pub fn with_source(source: S, config: Config) -> Result<Self> {
        let filter = AssetFilter::compile(config.filters.as_slice())?;
        Ok(Self {
            source,
            filter,
            validator: config.validator,
            platform: Platform::current(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn filter(&self) -> &AssetFilter {
        &self.filter
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Latest published release of `owner/repo`, skipping drafts and
    /// pre-releases.
    ///
    /// Assets are matched by their `<os>_<arch>` ending (`-` works as a
    /// separator too), optionally followed by `.zip`, `.tar.gz`, `.tgz`,
    /// `.gzip`, `.gz`, `.tar.xz` or `.xz`. On Windows an `.exe` may precede
    /// the compression extension, as in `foo_windows_amd64.exe.zip`.
    pub async fn detect_latest(&self, owner: &str, repo: &str) -> Result<Release> {
        self.detect_version(owner, repo, "").await
    }

    /// Release of `owner/repo` tagged exactly `version`, or the latest one
    /// when `version` is empty.
    pub async fn detect_version(&self, owner: &str, repo: &str, version: &str) -> Result<Release> {
        let releases = self
            .source
            .list_releases(owner, repo)
            .await
            .map_err(|e| match e {
                SourceError::NotFound => Error::RepositoryNotFound {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                },
                other => Error::FetchFailed {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    reason: other.to_string(),
                },
            })?;

        let matcher = AssetMatcher::new(self.platform, &self.filter);
        let selected = select_release(&releases, version, &matcher).map_err(|skipped| {
            Error::NoSuitableRelease {
                owner: owner.to_string(),
                repo: repo.to_string(),
                skipped,
            }
        })?;

        let validation_asset_id = match &self.validator {
            Some(validator) => {
                let name = format!("{}{}", selected.asset.name, validator.suffix());
                let asset = selected
                    .release
                    .asset_named(&name)
                    .ok_or(Error::ValidationAssetMissing { name })?;
                Some(asset.id)
            }
            None => None,
        };

        tracing::info!(
            "Found {}/{} {} with asset '{}'",
            owner,
            repo,
            selected.version,
            selected.asset.name
        );

        Ok(Release::new(
            selected.version,
            selected.release,
            selected.asset,
            validation_asset_id,
            owner,
            repo,
        ))
    }
}

static DEFAULT_UPDATER: OnceLock<Updater> = OnceLock::new();

/// Shared updater built from [`Config::discover`] on first use.
pub fn default_updater() -> Result<&'static Updater> {
    if let Some(updater) = DEFAULT_UPDATER.get() {
        return Ok(updater);
    }
    let updater = Updater::new(Config::discover()?)?;
    Ok(DEFAULT_UPDATER.get_or_init(|| updater))
}
