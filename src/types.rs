use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

/// A release as listed by the GitHub releases API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RawRelease {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<RawAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RawAsset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

impl RawRelease {
    /// Asset with exactly this file name, if attached to the release.
    pub fn asset_named(&self, name: &str) -> Option<&RawAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// The release and asset chosen for this platform.
///
/// Built once detection succeeds; the version it carries is always a parsed
/// semantic version.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Release {
    version: Version,
    asset_url: String,
    asset_byte_size: u64,
    asset_id: u64,
    asset_name: String,
    validation_asset_id: Option<u64>,
    url: String,
    release_notes: String,
    name: String,
    published_at: Option<DateTime<Utc>>,
    repo_owner: String,
    repo_name: String,
}

impl Release {
    pub(crate) fn new(
        version: Version,
        release: &RawRelease,
        asset: &RawAsset,
        validation_asset_id: Option<u64>,
        repo_owner: &str,
        repo_name: &str,
    ) -> Self {
        Self {
            version,
            asset_url: asset.browser_download_url.clone(),
            asset_byte_size: asset.size,
            asset_id: asset.id,
            asset_name: asset.name.clone(),
            validation_asset_id,
            url: release.html_url.clone(),
            release_notes: release.body.clone().unwrap_or_default(),
            name: release.name.clone().unwrap_or_default(),
            published_at: release.published_at,
            repo_owner: repo_owner.to_string(),
            repo_name: repo_name.to_string(),
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn asset_url(&self) -> &str {
        &self.asset_url
    }

    pub fn asset_byte_size(&self) -> u64 {
        self.asset_byte_size
    }

    pub fn asset_id(&self) -> u64 {
        self.asset_id
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Id of the checksum/signature asset, when a validator is configured.
    pub fn validation_asset_id(&self) -> Option<u64> {
        self.validation_asset_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn release_notes(&self) -> &str {
        &self.release_notes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn published_at(&self) -> Option<&DateTime<Utc>> {
        self.published_at.as_ref()
    }

    pub fn repo_owner(&self) -> &str {
        &self.repo_owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }
}
