//! Release tag to semantic version parsing.

use crate::error::{Error, Result};
use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

fn version_core() -> &'static Regex {
    static CORE: OnceLock<Regex> = OnceLock::new();
    CORE.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+").expect("version core pattern is valid"))
}

/// Parse a release tag such as `v1.2.3`, `tool-1.2.3-beta.1` or `1.2.3+build5`.
///
/// The first `MAJOR.MINOR.PATCH` run in the tag starts the version; anything
/// before it is treated as a prefix and dropped. Leading zeros in the three
/// core numbers are ignored, so `v01.02.03` reads as `1.2.3`.
pub fn parse_version(tag: &str) -> Result<Version> {
    let core = version_core()
        .find(tag)
        .ok_or_else(|| Error::UnparsableVersion {
            tag: tag.to_string(),
        })?;

    if core.start() > 0 {
        tracing::debug!(
            "Dropping prefix {:?} from tag {:?}",
            &tag[..core.start()],
            tag
        );
    }

    let normalized = core
        .as_str()
        .split('.')
        .map(strip_leading_zeros)
        .collect::<Vec<_>>()
        .join(".");
    let candidate = format!("{}{}", normalized, &tag[core.end()..]);

    Version::parse(candidate.trim()).map_err(|source| Error::InvalidSemver {
        tag: tag.to_string(),
        source,
    })
}

fn strip_leading_zeros(number: &str) -> &str {
    let trimmed = number.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}
