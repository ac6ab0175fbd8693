//! Choosing the best release for this platform.

use crate::error::{SkipKind, SkipReason};
use crate::matcher::AssetMatcher;
use crate::types::{RawAsset, RawRelease};
use crate::version::parse_version;
use semver::Version;

/// A release, the asset to install from it and its parsed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected<'r> {
    pub release: &'r RawRelease,
    pub asset: &'r RawAsset,
    pub version: Version,
}

/// Pick the release with the highest version that has an asset for this
/// platform.
///
/// An empty `target` means "latest": drafts and pre-releases are skipped. A
/// non-empty `target` only considers releases whose tag equals it exactly,
/// whatever their draft or pre-release flags. Equal versions keep the release
/// listed first.
pub fn select_release<'r>(
    releases: &'r [RawRelease],
    target: &str,
    matcher: &AssetMatcher<'_>,
) -> Result<Selected<'r>, Vec<SkipReason>> {
    let mut skipped = Vec::new();
    let mut best: Option<Selected<'r>> = None;
    let mut target_seen = false;

    for release in releases {
        if !target.is_empty() {
            if release.tag_name != target {
                continue;
            }
            target_seen = true;
        } else if release.draft {
            skipped.push(skip(release, SkipKind::Draft));
            continue;
        } else if release.prerelease {
            skipped.push(skip(release, SkipKind::Prerelease));
            continue;
        }

        let Some(asset) = matcher.find(&release.assets) else {
            let platform = matcher.platform();
            tracing::debug!(
                "Release {} has no asset for {}",
                release.tag_name,
                platform
            );
            skipped.push(skip(
                release,
                SkipKind::NoMatchingAsset {
                    os: platform.os.to_string(),
                    arch: platform.arch.to_string(),
                },
            ));
            continue;
        };

        let version = match parse_version(&release.tag_name) {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!("Skipping release {}: {}", release.tag_name, e);
                skipped.push(skip(release, SkipKind::BadVersion(e.to_string())));
                continue;
            }
        };

        tracing::trace!(
            "Candidate {} ({}) with asset '{}'",
            release.tag_name,
            version,
            asset.name
        );

        if best.as_ref().map_or(true, |b| version > b.version) {
            best = Some(Selected {
                release,
                asset,
                version,
            });
        }
    }

    if !target.is_empty() && !target_seen {
        tracing::debug!("No release is tagged {:?}", target);
        skipped.push(SkipReason {
            tag: target.to_string(),
            kind: SkipKind::TagNotFound,
        });
    }

    best.ok_or(skipped)
}

fn skip(release: &RawRelease, kind: SkipKind) -> SkipReason {
    SkipReason {
        tag: release.tag_name.clone(),
        kind,
    }
}
