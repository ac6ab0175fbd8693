#[cfg(test)]
mod tests {
    use crate::platform::{Arch, Os, Platform};
    use crate::source::{ReleaseSource, SourceError};
    use crate::types::{RawAsset, RawRelease};
    use crate::validate::Sha256Validator;
    use crate::{Config, Error, Updater};
    use chrono::{TimeZone, Utc};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use reqwest::StatusCode;
    use semver::Version;
    use sha2::{Digest, Sha256};
    use std::collections::HashMap;
    use std::fs;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    enum Listing {
        Releases(Vec<RawRelease>),
        NotFound,
        Status(StatusCode),
        InvalidUrl,
    }

    struct FakeSource {
        listing: Listing,
        assets: HashMap<u64, Vec<u8>>,
        downloads: AtomicUsize,
    }

    impl FakeSource {
        fn new(releases: Vec<RawRelease>) -> Self {
            Self {
                listing: Listing::Releases(releases),
                assets: HashMap::new(),
                downloads: AtomicUsize::new(0),
            }
        }

        fn failing(listing: Listing) -> Self {
            Self {
                listing,
                assets: HashMap::new(),
                downloads: AtomicUsize::new(0),
            }
        }

        fn with_asset(mut self, id: u64, bytes: Vec<u8>) -> Self {
            self.assets.insert(id, bytes);
            self
        }
    }

    impl ReleaseSource for FakeSource {
        async fn list_releases(
            &self,
            _owner: &str,
            _repo: &str,
        ) -> Result<Vec<RawRelease>, SourceError> {
            match &self.listing {
                Listing::Releases(releases) => Ok(releases.clone()),
                Listing::NotFound => Err(SourceError::NotFound),
                Listing::Status(status) => Err(SourceError::Status(*status)),
                Listing::InvalidUrl => Err(SourceError::InvalidUrl("bad path".to_string())),
            }
        }

        async fn download_asset(
            &self,
            _owner: &str,
            _repo: &str,
            asset_id: u64,
        ) -> Result<Vec<u8>, SourceError> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            self.assets
                .get(&asset_id)
                .cloned()
                .ok_or(SourceError::NotFound)
        }
    }

    fn linux() -> Platform {
        Platform::new(Os::Linux, Arch::Amd64)
    }

    fn release(tag: &str, assets: &[(u64, &str)]) -> RawRelease {
        RawRelease {
            tag_name: tag.to_string(),
            html_url: format!("https://github.com/owner/tool/releases/tag/{}", tag),
            body: Some(format!("Notes for {}", tag)),
            name: Some(format!("Release {}", tag)),
            published_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single(),
            assets: assets
                .iter()
                .map(|(id, name)| RawAsset {
                    id: *id,
                    name: name.to_string(),
                    browser_download_url: format!(
                        "https://github.com/owner/tool/releases/download/{}/{}",
                        tag, name
                    ),
                    size: 100 + id,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn updater(source: FakeSource, config: Config) -> Updater<FakeSource> {
        Updater::with_source(source, config)
            .unwrap()
            .with_platform(linux())
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn test_detect_latest_builds_release_record() {
        let source = FakeSource::new(vec![
            release("v1.2.0", &[(1, "tool_linux_amd64.tar.gz")]),
            release("v1.10.0", &[(2, "tool_darwin_amd64.tar.gz"), (3, "tool_linux_amd64.tar.gz")]),
            release("v1.9.0", &[(4, "tool_linux_amd64.tar.gz")]),
        ]);
        let updater = updater(source, Config::default());

        let rel = updater.detect_latest("owner", "tool").await.unwrap();
        assert_eq!(rel.version(), &Version::new(1, 10, 0));
        assert_eq!(rel.asset_id(), 3);
        assert_eq!(rel.asset_byte_size(), 103);
        assert_eq!(rel.asset_name(), "tool_linux_amd64.tar.gz");
        assert_eq!(
            rel.asset_url(),
            "https://github.com/owner/tool/releases/download/v1.10.0/tool_linux_amd64.tar.gz"
        );
        assert_eq!(rel.validation_asset_id(), None);
        assert_eq!(rel.url(), "https://github.com/owner/tool/releases/tag/v1.10.0");
        assert_eq!(rel.release_notes(), "Notes for v1.10.0");
        assert_eq!(rel.name(), "Release v1.10.0");
        assert!(rel.published_at().is_some());
        assert_eq!(rel.repo_owner(), "owner");
        assert_eq!(rel.repo_name(), "tool");
    }

    #[tokio::test]
    async fn test_no_releases() {
        let updater = updater(FakeSource::new(Vec::new()), Config::default());
        match updater.detect_latest("owner", "tool").await {
            Err(Error::NoSuitableRelease { skipped, .. }) => assert!(skipped.is_empty()),
            other => panic!("expected NoSuitableRelease, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repository_not_found() {
        let updater = updater(FakeSource::failing(Listing::NotFound), Config::default());
        assert!(matches!(
            updater.detect_latest("owner", "missing").await,
            Err(Error::RepositoryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_failed() {
        let source = FakeSource::failing(Listing::Status(StatusCode::INTERNAL_SERVER_ERROR));
        let updater = updater(source, Config::default());
        match updater.detect_latest("owner", "tool").await {
            Err(Error::FetchFailed { reason, .. }) => assert!(reason.contains("500")),
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_request_url_is_fetch_failure() {
        let updater = updater(FakeSource::failing(Listing::InvalidUrl), Config::default());
        match updater.detect_latest("owner", "tool").await {
            Err(Error::FetchFailed { reason, .. }) => {
                assert!(reason.contains("invalid request URL"))
            }
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exact_version_allows_prerelease() {
        let mut pre = release("v2.0.0-rc.1", &[(2, "tool_linux_amd64")]);
        pre.prerelease = true;
        let source = FakeSource::new(vec![release("v1.0.0", &[(1, "tool_linux_amd64")]), pre]);
        let updater = updater(source, Config::default());

        let latest = updater.detect_latest("owner", "tool").await.unwrap();
        assert_eq!(latest.version(), &Version::new(1, 0, 0));

        let rc = updater
            .detect_version("owner", "tool", "v2.0.0-rc.1")
            .await
            .unwrap();
        assert_eq!(rc.version(), &Version::parse("2.0.0-rc.1").unwrap());

        match updater.detect_version("owner", "tool", "v3.0.0").await {
            Err(err @ Error::NoSuitableRelease { .. }) => assert_eq!(
                err.to_string(),
                "no suitable release in owner/tool (release \"v3.0.0\" not found)"
            ),
            other => panic!("expected NoSuitableRelease, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_filters_restrict_assets() {
        let source = FakeSource::new(vec![release(
            "v1.0.0",
            &[(1, "tool-extra_linux_amd64"), (2, "tool-core_linux_amd64")],
        )]);
        let config = Config {
            filters: vec!["^tool-core".to_string()],
            ..Default::default()
        };
        let rel = updater(source, config)
            .detect_latest("owner", "tool")
            .await
            .unwrap();
        assert_eq!(rel.asset_name(), "tool-core_linux_amd64");

        let source = FakeSource::new(vec![release("v1.0.0", &[(1, "tool-extra_linux_amd64")])]);
        let config = Config {
            filters: vec!["^tool-core".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            updater(source, config).detect_latest("owner", "tool").await,
            Err(Error::NoSuitableRelease { .. })
        ));
    }

    #[tokio::test]
    async fn test_validation_asset_found() {
        let source = FakeSource::new(vec![release(
            "v1.0.0",
            &[(1, "tool_linux_amd64.tar.gz"), (9, "tool_linux_amd64.tar.gz.sha256")],
        )]);
        let config = Config::default().with_validator(Sha256Validator);
        let rel = updater(source, config)
            .detect_latest("owner", "tool")
            .await
            .unwrap();
        assert_eq!(rel.asset_id(), 1);
        assert_eq!(rel.validation_asset_id(), Some(9));
    }

    #[tokio::test]
    async fn test_validation_asset_missing() {
        let source = FakeSource::new(vec![release("v1.0.0", &[(1, "tool_linux_amd64.tar.gz")])]);
        let config = Config::default().with_validator(Sha256Validator);
        match updater(source, config).detect_latest("owner", "tool").await {
            Err(Error::ValidationAssetMissing { name }) => {
                assert_eq!(name, "tool_linux_amd64.tar.gz.sha256")
            }
            other => panic!("expected ValidationAssetMissing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_command_installs_newer_release() {
        let binary = b"#!/bin/sh\necho new\n".to_vec();
        let packed = gzip(&binary);
        let digest = hex::encode(Sha256::digest(&packed));
        let source = FakeSource::new(vec![release(
            "v1.1.0",
            &[(1, "tool_linux_amd64.gz"), (2, "tool_linux_amd64.gz.sha256")],
        )])
        .with_asset(1, packed)
        .with_asset(2, format!("{}  tool_linux_amd64.gz\n", digest).into_bytes());
        let updater = updater(source, Config::default().with_validator(Sha256Validator));

        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("tool");
        fs::write(&exe, b"old").unwrap();

        let rel = updater
            .update_command(&exe, &Version::new(1, 0, 0), "owner", "tool")
            .await
            .unwrap();
        assert_eq!(rel.version(), &Version::new(1, 1, 0));
        assert_eq!(fs::read(&exe).unwrap(), binary);
        assert_eq!(updater.source().downloads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_update_command_skips_when_current() {
        let source = FakeSource::new(vec![release("v1.0.0", &[(1, "tool_linux_amd64")])]);
        let updater = updater(source, Config::default());

        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("tool");
        fs::write(&exe, b"current").unwrap();

        let rel = updater
            .update_command(&exe, &Version::new(1, 0, 0), "owner", "tool")
            .await
            .unwrap();
        assert_eq!(rel.version(), &Version::new(1, 0, 0));
        assert_eq!(fs::read(&exe).unwrap(), b"current");
        assert_eq!(updater.source().downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_to_rejects_bad_checksum() {
        let source = FakeSource::new(vec![release(
            "v2.0.0",
            &[(1, "tool_linux_amd64"), (2, "tool_linux_amd64.sha256")],
        )])
        .with_asset(1, b"tampered".to_vec())
        .with_asset(2, hex::encode(Sha256::digest(b"genuine")).into_bytes());
        let updater = updater(source, Config::default().with_validator(Sha256Validator));
        let rel = updater.detect_latest("owner", "tool").await.unwrap();

        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("tool");
        fs::write(&exe, b"old").unwrap();

        assert!(matches!(
            updater.update_to(&rel, &exe).await,
            Err(Error::ValidationFailed { .. })
        ));
        assert_eq!(fs::read(&exe).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_update_to_reports_download_failure() {
        let source = FakeSource::new(vec![release("v2.0.0", &[(1, "tool_linux_amd64")])]);
        let updater = updater(source, Config::default());
        let rel = updater.detect_latest("owner", "tool").await.unwrap();

        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("tool");
        fs::write(&exe, b"old").unwrap();

        assert!(matches!(
            updater.update_to(&rel, &exe).await,
            Err(Error::Download { asset_id: 1, .. })
        ));
        assert_eq!(fs::read(&exe).unwrap(), b"old");
    }
}
