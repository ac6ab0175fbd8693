use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A repository reference: `owner/name`, optionally pinned with `@tag`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Slug {
    pub owner: String,
    pub name: String,
    pub tag: Option<String>,
}

impl Slug {
    /// Parse `owner/name` or `owner/name@tag`.
    pub fn parse(slug: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSlug {
            value: slug.to_string(),
            reason: reason.to_string(),
        };

        if slug.is_empty() {
            return Err(invalid("slug cannot be empty"));
        }

        if slug.starts_with('-') {
            return Err(invalid("it looks like a CLI flag"));
        }

        let (repo_part, tag) = match slug.split_once('@') {
            Some((_, "")) => return Err(invalid("missing tag after '@'")),
            Some((repo, tag)) => (repo, Some(tag.to_string())),
            None => (slug, None),
        };

        match repo_part.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Slug {
                owner: owner.to_string(),
                name: name.to_string(),
                tag,
            }),
            _ => Err(invalid("expected 'owner/name'")),
        }
    }

    /// Tag to request; empty means latest.
    pub fn version(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }

    pub fn full_repo(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for Slug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Slug::parse(s)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}/{}@{}", self.owner, self.name, tag),
            None => write!(f, "{}/{}", self.owner, self.name),
        }
    }
}
