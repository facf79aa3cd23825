//! Comparable `major.minor[.build][-qualifier]` revisions.

use crate::error::{IvyError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A structured revision.
///
/// An absent build number is distinct from build `0` and sorts before it, so
/// `1.2 < 1.2.0`. At equal numbers a revision without qualifier sorts above
/// any qualified one (`1.2.3-beta < 1.2.3`); two qualifiers compare
/// lexicographically. Equality agrees with the ordering: the qualifier is
/// part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision {
    major: u32,
    minor: u32,
    build: Option<u32>,
    qualifier: Option<String>,
}

impl Revision {
    pub const fn major(&self) -> u32 {
        self.major
    }

    pub const fn minor(&self) -> u32 {
        self.minor
    }

    pub const fn build(&self) -> Option<u32> {
        self.build
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

fn malformed(revision: &str, reason: impl Into<String>) -> IvyError {
    IvyError::MalformedRevision {
        revision: revision.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for Revision {
    type Err = IvyError;

    fn from_str(s: &str) -> Result<Self> {
        let (numbers, qualifier) = match s.split_once('-') {
            Some((numbers, qualifier)) => {
                let qualifier = qualifier.trim();
                (numbers, (!qualifier.is_empty()).then(|| qualifier.to_lowercase()))
            }
            None => (s, None),
        };

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| malformed(s, format!("'{}': {e}", part.trim())))
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        let (major, minor, build) = match *parts.as_slice() {
            [major, minor] => (parse(major)?, parse(minor)?, None),
            [major, minor, build] => (parse(major)?, parse(minor)?, Some(parse(build)?)),
            [_] => return Err(malformed(s, "missing '.' separator")),
            _ => return Err(malformed(s, "too many components")),
        };

        Ok(Self {
            major,
            minor,
            build,
            qualifier,
        })
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Revision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.build.cmp(&other.build))
            .then_with(|| match (&self.qualifier, &other.qualifier) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, "-{qualifier}")?;
        }
        Ok(())
    }
}
