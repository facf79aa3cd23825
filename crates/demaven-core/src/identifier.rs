//! Maven coordinates in `group#artifact[#version]` form.

use crate::error::{CoreError, Result};
use crate::template::{PropertyLookup, Value};
use std::fmt;
use std::str::FromStr;

/// A Maven coordinate.
///
/// Group and artifact IDs are always present, trimmed and non-empty. The
/// version is optional until the coordinate has been resolved against a
/// repository.
///
/// Ordering is lexicographic by group ID, artifact ID and then version, with
/// an absent version sorting before any present one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
}

impl Identifier {
    /// Builds a validated coordinate, trimming every field.
    pub fn new(
        group_id: impl AsRef<str>,
        artifact_id: impl AsRef<str>,
        version: Option<&str>,
    ) -> Result<Self> {
        let identifier = Self {
            group_id: group_id.as_ref().trim().to_string(),
            artifact_id: artifact_id.as_ref().trim().to_string(),
            version: version.map(|v| v.trim().to_string()),
        };
        identifier.validate()?;
        Ok(identifier)
    }

    fn validate(&self) -> Result<()> {
        let input = self.as_string();
        if self.group_id.is_empty() {
            return Err(CoreError::malformed(&input, "empty group ID"));
        }
        if self.artifact_id.is_empty() {
            return Err(CoreError::malformed(&input, "empty artifact ID"));
        }
        if self.version.as_deref() == Some("") {
            return Err(CoreError::malformed(&input, "empty version"));
        }
        let separator = [&self.group_id, &self.artifact_id]
            .into_iter()
            .chain(self.version.as_ref())
            .any(|field| field.contains('#'));
        if separator {
            return Err(CoreError::malformed(&input, "too many '#' separators"));
        }
        Ok(())
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The same coordinate without its version.
    pub fn unversioned(&self) -> Self {
        Self {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: None,
        }
    }

    /// The same coordinate with `version` replacing the current one.
    pub fn with_version(&self, version: impl Into<String>) -> Result<Self> {
        Self::new(&self.group_id, &self.artifact_id, Some(&version.into()))
    }

    /// Renders the coordinate as `group#artifact[#version]`.
    pub fn as_string(&self) -> String {
        match &self.version {
            Some(version) => format!("{}#{}#{}", self.group_id, self.artifact_id, version),
            None => format!("{}#{}", self.group_id, self.artifact_id),
        }
    }
}

impl FromStr for Identifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, '#');
        let group_id = parts.next().unwrap_or_default();
        let Some(artifact_id) = parts.next() else {
            return Err(CoreError::malformed(s, "missing '#' separator"));
        };
        Self::new(group_id, artifact_id, parts.next())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl PropertyLookup for Identifier {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "groupId" => Some(Value::text(&self.group_id)),
            "artifactId" => Some(Value::text(&self.artifact_id)),
            "version" => self.version.as_deref().map(Value::text),
            _ => None,
        }
    }
}
