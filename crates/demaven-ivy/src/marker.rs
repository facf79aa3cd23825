//! Ivy coordinates.

use crate::error::{IvyError, Result};
use crate::revision::Revision;
use demaven_core::Identifier;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An Ivy `organisation#module#revision` coordinate, optionally remembering
/// the Maven coordinate it was translated from.
///
/// Equality, hashing and ordering ignore the source coordinate.
#[derive(Debug, Clone)]
pub struct Marker {
    source: Option<Identifier>,
    organisation: String,
    module: String,
    revision: Revision,
}

fn malformed(marker: &str, reason: &str) -> IvyError {
    IvyError::MalformedMarker {
        marker: marker.to_string(),
        reason: reason.to_string(),
    }
}

impl Marker {
    pub fn new(
        source: Option<Identifier>,
        organisation: &str,
        module: &str,
        revision: &str,
    ) -> Result<Self> {
        let marker = Self {
            source,
            organisation: organisation.trim().to_string(),
            module: module.trim().to_string(),
            revision: revision.trim().parse()?,
        };
        marker.validate()?;
        Ok(marker)
    }

    /// Parses `org#module[#revision]`, taking an omitted revision from the
    /// version of `source`.
    pub fn parse(source: Option<Identifier>, marker: &str) -> Result<Self> {
        let mut parts = marker.splitn(3, '#');
        let organisation = parts.next().unwrap_or_default();
        let Some(module) = parts.next() else {
            return Err(malformed(marker, "missing '#' separator"));
        };
        let revision = match parts.next() {
            Some(revision) => revision.to_string(),
            None => source
                .as_ref()
                .and_then(Identifier::version)
                .map(str::to_string)
                .ok_or_else(|| malformed(marker, "no revision given"))?,
        };
        Self::new(source, organisation, module, &revision)
    }

    fn validate(&self) -> Result<()> {
        if self.organisation.is_empty() {
            return Err(malformed(&self.as_string(), "empty organisation"));
        }
        if self.module.is_empty() {
            return Err(malformed(&self.as_string(), "empty module"));
        }
        if self.organisation.contains('#') || self.module.contains('#') {
            return Err(malformed(&self.as_string(), "too many '#' separators"));
        }
        Ok(())
    }

    /// The Maven coordinate this marker was translated from.
    pub const fn source(&self) -> Option<&Identifier> {
        self.source.as_ref()
    }

    pub fn organisation(&self) -> &str {
        &self.organisation
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub const fn revision(&self) -> &Revision {
        &self.revision
    }

    /// Whether `other` names the same organisation and module.
    pub fn same_module(&self, other: &Self) -> bool {
        self.organisation == other.organisation && self.module == other.module
    }

    pub fn as_string(&self) -> String {
        format!("{}#{}#{}", self.organisation, self.module, self.revision)
    }
}

impl FromStr for Marker {
    type Err = IvyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(None, s)
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Marker {}

impl Hash for Marker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.organisation.hash(state);
        self.module.hash(state);
        self.revision.hash(state);
    }
}

impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Marker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.organisation
            .cmp(&other.organisation)
            .then_with(|| self.module.cmp(&other.module))
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}
