//! Registry of accepted licenses.
//!
//! Licenses declared by POM files are matched against the registry by URL
//! first and by name second. Both lookups are trimmed and case-insensitive.
//!
//! The registry is loaded from a TOML document:
//!
//! ```toml
//! [licenses.apache-2]
//! name = "Apache License, Version 2.0"
//! location = "https://www.apache.org/licenses/LICENSE-2.0"
//! names = ["The Apache Software License, Version 2.0"]
//! locations = ["http://www.apache.org/licenses/LICENSE-2.0.txt"]
//! ```

use crate::error::{CoreError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use toml_edit::{DocumentMut, Item};

/// A license known to the registry. Identity is the license ID.
#[derive(Debug, Clone)]
pub struct License {
    id: String,
    name: String,
    location: String,
}

impl License {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into().trim().to_lowercase(),
            name: name.into().trim().to_string(),
            location: location.into().trim().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical URL of the license text.
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl PartialEq for License {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for License {}

impl Hash for License {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for License {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for License {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

fn key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct LicenseRegistry {
    by_name: HashMap<String, Arc<License>>,
    by_location: HashMap<String, Arc<License>>,
}

impl LicenseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `license` under its own name and location.
    pub fn register(&mut self, license: License) -> Arc<License> {
        let license = Arc::new(license);
        self.by_name.insert(key(&license.name), Arc::clone(&license));
        self.by_location
            .insert(key(&license.location), Arc::clone(&license));
        license
    }

    pub fn add_name(&mut self, license: &Arc<License>, name: &str) {
        self.by_name.insert(key(name), Arc::clone(license));
    }

    pub fn add_location(&mut self, license: &Arc<License>, location: &str) {
        self.by_location.insert(key(location), Arc::clone(license));
    }

    pub fn by_location(&self, location: &str) -> Result<Arc<License>> {
        self.by_location
            .get(&key(location))
            .cloned()
            .ok_or_else(|| CoreError::UnknownLicenseLocation {
                location: location.trim().to_string(),
            })
    }

    pub fn by_name(&self, name: &str) -> Result<Arc<License>> {
        self.by_name
            .get(&key(name))
            .cloned()
            .ok_or_else(|| CoreError::UnknownLicenseName {
                name: name.trim().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        let mut ids: Vec<&str> = self.by_name.values().map(|l| l.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Loads the registry from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading licenses from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Parses the registry from TOML text; `location` is used in errors.
    pub fn from_toml(content: &str, location: &str) -> Result<Self> {
        let config_error = |message: String| CoreError::Config {
            location: location.to_string(),
            message,
        };

        let doc: DocumentMut = content
            .parse()
            .map_err(|e: toml_edit::TomlError| config_error(e.to_string()))?;

        let mut registry = Self::new();
        let Some(licenses) = doc.get("licenses").and_then(Item::as_table_like) else {
            return Err(config_error("missing [licenses] table".into()));
        };

        for (id, item) in licenses.iter() {
            let Some(table) = item.as_table_like() else {
                return Err(config_error(format!("license '{id}' is not a table")));
            };
            let field = |name: &str| table.get(name).and_then(Item::as_str);

            let Some(name) = field("name") else {
                return Err(config_error(format!("no name found for license '{id}'")));
            };
            let Some(location) = field("location") else {
                return Err(config_error(format!("no location found for license '{id}'")));
            };

            let license = registry.register(License::new(id, name, location));
            for alias in string_array(table.get("names")) {
                registry.add_name(&license, alias);
            }
            for alias in string_array(table.get("locations")) {
                registry.add_location(&license, alias);
            }
        }

        tracing::debug!("Loaded {} licenses", registry.len());
        Ok(registry)
    }
}

fn string_array(item: Option<&Item>) -> impl Iterator<Item = &str> {
    item.and_then(Item::as_array)
        .into_iter()
        .flat_map(|array| array.iter().filter_map(|v| v.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LICENSES: &str = r#"
[licenses.apache-2]
name = "Apache License, Version 2.0"
location = "https://www.apache.org/licenses/LICENSE-2.0"
names = ["The Apache Software License, Version 2.0", "ASL 2.0"]
locations = ["http://www.apache.org/licenses/LICENSE-2.0.txt"]

[licenses.mit]
name = "MIT License"
location = "https://opensource.org/licenses/MIT"
"#;

    #[test]
    fn test_lookup_by_location_and_name() {
        let registry = LicenseRegistry::from_toml(LICENSES, "licenses.toml").unwrap();
        assert_eq!(registry.len(), 2);

        let apache = registry
            .by_location(" HTTP://www.apache.org/licenses/LICENSE-2.0.txt ")
            .unwrap();
        assert_eq!(apache.id(), "apache-2");
        assert_eq!(apache.location(), "https://www.apache.org/licenses/LICENSE-2.0");

        assert_eq!(registry.by_name("asl 2.0").unwrap().id(), "apache-2");
        assert_eq!(registry.by_name("MIT License").unwrap().id(), "mit");
    }

    #[test]
    fn test_unknown_license() {
        let registry = LicenseRegistry::from_toml(LICENSES, "licenses.toml").unwrap();
        assert!(matches!(
            registry.by_location("http://example.com/eula"),
            Err(CoreError::UnknownLicenseLocation { .. })
        ));
        assert!(matches!(
            registry.by_name(" Proprietary "),
            Err(CoreError::UnknownLicenseName { ref name }) if name == "Proprietary"
        ));
    }

    #[test]
    fn test_missing_fields() {
        let result = LicenseRegistry::from_toml("[licenses.x]\nname = \"X\"\n", "bad.toml");
        assert!(matches!(result, Err(CoreError::Config { ref location, .. }) if location == "bad.toml"));
        assert!(LicenseRegistry::from_toml("licenses = 3", "bad.toml").is_err());
        assert!(LicenseRegistry::from_toml("[licenses", "bad.toml").is_err());
    }

    #[test]
    fn test_identity_is_id() {
        let a = License::new("MIT", "MIT License", "https://opensource.org/licenses/MIT");
        let b = License::new("mit", "Other name", "https://example.com");
        assert_eq!(a, b);
        assert!(License::new("apache-2", "", "") < a);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LICENSES.as_bytes()).unwrap();
        let registry = LicenseRegistry::load(file.path()).unwrap();
        assert!(!registry.is_empty());
    }
}
