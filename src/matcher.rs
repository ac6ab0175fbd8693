//! Asset name matching against a platform and optional filters.

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::types::RawAsset;
use regex::Regex;

/// Ordered regular expressions an asset name must satisfy at least one of.
///
/// An empty filter accepts every name.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    patterns: Vec<Regex>,
}

impl AssetFilter {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| Error::InvalidFilterPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.is_empty() || self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// Decides which assets are installable on one platform.
#[derive(Debug, Clone)]
pub struct AssetMatcher<'a> {
    platform: Platform,
    suffixes: Vec<String>,
    filter: &'a AssetFilter,
}

impl<'a> AssetMatcher<'a> {
    pub fn new(platform: Platform, filter: &'a AssetFilter) -> Self {
        Self {
            platform,
            suffixes: platform.asset_suffixes(),
            filter,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn matches(&self, name: &str) -> bool {
        if !self.filter.accepts(name) {
            tracing::trace!("Asset '{}' rejected by filters", name);
            return false;
        }
        match self.suffixes.iter().find(|s| name.ends_with(s.as_str())) {
            Some(suffix) => {
                tracing::trace!("Asset '{}' matches suffix '{}'", name, suffix);
                true
            }
            None => false,
        }
    }

    /// First matching asset in listing order.
    ///
    /// When several assets qualify the listing order decides, so the result is
    /// only as stable as the order the hosting service returns.
    pub fn find<'r>(&self, assets: &'r [RawAsset]) -> Option<&'r RawAsset> {
        assets.iter().find(|asset| self.matches(&asset.name))
    }
}
