//! Translation of Maven coordinates into Ivy markers.
//!
//! The mapper knows three tables:
//!
//! * overrides, Maven to Maven renames read from a mappings file, keyed by a
//!   full coordinate or by an unversioned one acting as a wildcard;
//! * known targets, every Ivy descriptor already present in the libraries
//!   directory keyed by the Maven coordinate it was generated from;
//! * latest targets, derived from the known ones: the highest revision per
//!   unversioned Maven coordinate.

use crate::error::{IvyError, Result};
use crate::marker::Marker;
use demaven_core::{CoreError, Identifier, parse_xml};
use std::collections::HashMap;
use std::path::Path;
use toml_edit::DocumentMut;

#[derive(Debug, Clone, Default)]
pub struct Mapper {
    overrides: HashMap<Identifier, Identifier>,
    known: HashMap<Identifier, Marker>,
    latest: HashMap<Identifier, Marker>,
}

impl Mapper {
    /// Builds a mapper from explicit tables.
    ///
    /// # Errors
    ///
    /// Fails with [`IvyError::InconsistentLatestMapping`] when two known
    /// targets share an unversioned Maven coordinate but not their Ivy
    /// organisation and module.
    pub fn new(
        overrides: HashMap<Identifier, Identifier>,
        known: HashMap<Identifier, Marker>,
    ) -> Result<Self> {
        let mut mapper = Self {
            overrides,
            known,
            latest: HashMap::new(),
        };
        mapper.calculate_latest()?;
        Ok(mapper)
    }

    /// Scans `libraries` for `ivy.xml` descriptors and reads overrides from
    /// `mappings`.
    pub fn load(libraries: &Path, mappings: &Path) -> Result<Self> {
        if !libraries.is_dir() {
            return Err(IvyError::NotADirectory {
                path: libraries.to_path_buf(),
            });
        }
        tracing::info!("Initializing repository mappings from {}", libraries.display());
        let mut known = HashMap::new();
        scan(libraries, &mut known)?;

        let overrides = load_overrides(mappings)?;
        Self::new(overrides, known)
    }

    fn calculate_latest(&mut self) -> Result<()> {
        // Coordinate order, so conflicts are reported deterministically.
        let mut entries: Vec<(&Identifier, &Marker)> = self.known.iter().collect();
        entries.sort();

        for (identifier, marker) in entries {
            let unversioned = identifier.unversioned();
            let newer = match self.latest.get(&unversioned) {
                None => true,
                Some(found) if !found.same_module(marker) => {
                    return Err(IvyError::InconsistentLatestMapping {
                        marker: marker.as_string(),
                        found: found.as_string(),
                    });
                }
                Some(found) => found.revision() < marker.revision(),
            };
            if newer {
                self.latest.insert(unversioned, marker.clone());
            }
        }

        let mut latest: Vec<_> = self.latest.iter().collect();
        latest.sort();
        for (identifier, marker) in latest {
            tracing::debug!("Latest version of {} is {}", identifier, marker);
        }
        Ok(())
    }

    /// The highest known marker for `identifier`, ignoring its version.
    ///
    /// Falls back to a scan for a marker whose organisation and module equal
    /// the group and artifact IDs; among several, the highest wins.
    pub fn get_latest(&self, identifier: &Identifier) -> Option<&Marker> {
        if let Some(marker) = self.latest.get(&identifier.unversioned()) {
            return Some(marker);
        }
        self.latest
            .values()
            .filter(|m| {
                m.organisation() == identifier.group_id() && m.module() == identifier.artifact_id()
            })
            .max()
    }

    /// Translates a Maven coordinate into the Ivy marker to depend on.
    ///
    /// An exact override is applied first, then a wildcard override. A
    /// wildcard whose target has no version keeps the version being mapped.
    /// Unversioned coordinates resolve to the latest known marker; versioned
    /// ones only to the exact known marker.
    pub fn get_ivy_marker(&self, identifier: &Identifier) -> Option<&Marker> {
        let mut current = identifier.clone();

        if let Some(mapped) = self.overrides.get(&current) {
            tracing::warn!("Using mapped {} instead of {}", mapped, current);
            current = mapped.clone();
        }

        if let Some(mapped) = self.overrides.get(&current.unversioned()) {
            let target = match (mapped.version(), current.version()) {
                (None, Some(version)) => mapped.with_version(version).ok(),
                _ => Some(mapped.clone()),
            };
            if let Some(target) = target {
                tracing::warn!("Using mapped {} instead of {}", target, current);
                current = target;
            }
        }

        if current.version().is_none() {
            let marker = self.latest.get(&current);
            if let Some(marker) = marker {
                tracing::warn!("Using latest version {} for {}", marker, current);
            }
            return marker;
        }

        self.known.get(&current)
    }

    pub const fn overrides(&self) -> &HashMap<Identifier, Identifier> {
        &self.overrides
    }

    pub const fn known(&self) -> &HashMap<Identifier, Marker> {
        &self.known
    }
}

fn scan(path: &Path, known: &mut HashMap<Identifier, Marker>) -> Result<()> {
    if path.is_dir() {
        let mut entries = std::fs::read_dir(path)
            .map_err(CoreError::from)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(CoreError::from)?;
        entries.sort();
        for entry in entries {
            scan(&entry, known)?;
        }
    } else if path.file_name().is_some_and(|name| name == "ivy.xml") {
        if let Some((identifier, marker)) = read_descriptor(path)? {
            tracing::debug!("Added mapping from Maven {} to Ivy {}", identifier, marker);
            known.insert(identifier, marker);
        }
    }
    Ok(())
}

/// Reads the Maven coordinate and Ivy marker recorded in one descriptor.
fn read_descriptor(path: &Path) -> Result<Option<(Identifier, Marker)>> {
    let invalid = |message: String| IvyError::InvalidLibrary {
        path: path.to_path_buf(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(CoreError::from)?;
    let node = parse_xml(&content, &path.display().to_string(), None)?;
    let Some(info) = node.child("info") else {
        return Err(invalid("no <info/> element".into()));
    };

    let maven = info
        .attribute("maven")
        .or_else(|| info.child("maven").and_then(|m| m.attribute("id")));
    let Some(maven) = maven else {
        tracing::warn!("No maven info found in {}", path.display());
        return Ok(None);
    };

    let attribute = |name: &str| {
        info.attribute(name)
            .ok_or_else(|| invalid(format!("missing '{name}' attribute")))
    };
    let identifier: Identifier = maven.parse()?;
    let marker = Marker::new(
        Some(identifier.clone()),
        attribute("organisation")?,
        attribute("module")?,
        attribute("revision")?,
    )?;
    Ok(Some((identifier, marker)))
}

/// Reads the override table: a flat TOML document of
/// `"group#artifact[#version]" = "group#artifact[#version]"` entries.
fn load_overrides(path: &Path) -> Result<HashMap<Identifier, Identifier>> {
    if !path.is_file() {
        return Err(CoreError::Config {
            location: path.display().to_string(),
            message: "mappings file not found".into(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path).map_err(CoreError::from)?;
    parse_overrides(&content, &path.display().to_string())
}

pub fn parse_overrides(content: &str, location: &str) -> Result<HashMap<Identifier, Identifier>> {
    let config_error = |message: String| CoreError::Config {
        location: location.to_string(),
        message,
    };

    let doc: DocumentMut = content
        .parse()
        .map_err(|e: toml_edit::TomlError| config_error(e.to_string()))?;

    let mut overrides = HashMap::new();
    for (key, item) in doc.iter() {
        let Some(value) = item.as_str() else {
            return Err(config_error(format!("mapping for '{key}' is not a string")).into());
        };
        let from: Identifier = key.parse()?;
        let to: Identifier = value.parse()?;
        tracing::info!("Added mapping from Maven {} to Maven {}", from, to);
        overrides.insert(from, to);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn id(s: &str) -> Identifier {
        s.parse().unwrap()
    }

    fn known(entries: &[(&str, &str)]) -> HashMap<Identifier, Marker> {
        entries
            .iter()
            .map(|(maven, ivy)| {
                let identifier = id(maven);
                let marker = Marker::parse(Some(identifier.clone()), ivy).unwrap();
                (identifier, marker)
            })
            .collect()
    }

    fn overrides(entries: &[(&str, &str)]) -> HashMap<Identifier, Identifier> {
        entries.iter().map(|(from, to)| (id(from), id(to))).collect()
    }

    fn lookup(mapper: &Mapper, identifier: &str) -> Option<String> {
        mapper.get_ivy_marker(&id(identifier)).map(Marker::as_string)
    }

    #[test]
    fn test_exact_lookup() {
        let mapper = Mapper::new(
            HashMap::new(),
            known(&[("g#a#1.0", "org#mod#1.0"), ("g#a#2.0", "org#mod#2.0")]),
        )
        .unwrap();
        assert_eq!(lookup(&mapper, "g#a#1.0").as_deref(), Some("org#mod#1.0"));
        assert_eq!(lookup(&mapper, "g#a#3.0"), None);
        assert_eq!(lookup(&mapper, "x#y#1.0"), None);
    }

    #[test]
    fn test_unversioned_uses_latest() {
        let mapper = Mapper::new(
            HashMap::new(),
            known(&[
                ("g#a#1.0", "org#mod#1.0"),
                ("g#a#2.0", "org#mod#2.0"),
                ("g#a#2.0-rc1", "org#mod#2.0-rc1"),
            ]),
        )
        .unwrap();
        assert_eq!(lookup(&mapper, "g#a").as_deref(), Some("org#mod#2.0"));
        assert_eq!(
            mapper.get_latest(&id("g#a#1.0")).map(Marker::as_string).as_deref(),
            Some("org#mod#2.0")
        );
    }

    #[test]
    fn test_exact_override_wins_over_wildcard() {
        let mapper = Mapper::new(
            overrides(&[("d#e#1.0", "p#q#1.0"), ("d#e", "x#y")]),
            known(&[
                ("p#q#1.0", "org#pq#1.0"),
                ("x#y#1.0", "org#xy#1.0"),
                ("x#y#3.0", "org#xy#3.0"),
            ]),
        )
        .unwrap();
        assert_eq!(lookup(&mapper, "d#e#1.0").as_deref(), Some("org#pq#1.0"));
    }

    #[test]
    fn test_wildcard_override_keeps_version() {
        let mapper = Mapper::new(
            overrides(&[("d#e", "x#y")]),
            known(&[("x#y#2.0.0", "x#y#2.0.0"), ("x#y#3.0.0", "x#y#3.0.0")]),
        )
        .unwrap();
        assert_eq!(lookup(&mapper, "d#e#2.0.0").as_deref(), Some("x#y#2.0.0"));
        assert_eq!(lookup(&mapper, "d#e#9.9.9"), None);
        assert_eq!(lookup(&mapper, "d#e").as_deref(), Some("x#y#3.0.0"));
    }

    #[test]
    fn test_versioned_wildcard_target() {
        let mapper = Mapper::new(
            overrides(&[("d#e", "x#y#2.0.0")]),
            known(&[("x#y#2.0.0", "x#y#2.0.0"), ("x#y#3.0.0", "x#y#3.0.0")]),
        )
        .unwrap();
        assert_eq!(lookup(&mapper, "d#e#1.0").as_deref(), Some("x#y#2.0.0"));
    }

    #[test]
    fn test_unversioned_prefers_latest_over_exact() {
        let mapper = Mapper::new(
            overrides(&[("old#lib#1.0", "g#a")]),
            known(&[("g#a#1.0", "org#mod#1.0"), ("g#a#2.0", "org#mod#2.0")]),
        )
        .unwrap();
        assert_eq!(lookup(&mapper, "old#lib#1.0").as_deref(), Some("org#mod#2.0"));
    }

    #[test]
    fn test_inconsistent_latest() {
        let result = Mapper::new(
            HashMap::new(),
            known(&[("g#a#1.0", "org#one#1.0"), ("g#a#2.0", "org#two#2.0")]),
        );
        assert!(matches!(result, Err(IvyError::InconsistentLatestMapping { .. })));
    }

    #[test]
    fn test_get_latest_scan_fallback() {
        let mapper = Mapper::new(
            HashMap::new(),
            known(&[
                ("a#org.example#1.0", "org.example#lib#1.0"),
                ("b#org.example#1.0", "org.example#lib#1.5"),
            ]),
        )
        .unwrap();
        assert_eq!(
            mapper
                .get_latest(&id("org.example#lib"))
                .map(Marker::as_string)
                .as_deref(),
            Some("org.example#lib#1.5")
        );
        assert!(mapper.get_latest(&id("none#none")).is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let overrides = parse_overrides(
            "\"commons-lang#commons-lang\" = \"org.apache.commons#commons-lang3\"\n\
             \"a#b#1.0\" = \"c#d#2.0\"\n",
            "mappings.toml",
        )
        .unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(
            overrides[&id("commons-lang#commons-lang")].as_string(),
            "org.apache.commons#commons-lang3"
        );

        assert!(parse_overrides("\"a#b\" = 1", "mappings.toml").is_err());
        assert!(parse_overrides("\"nosep\" = \"a#b\"", "mappings.toml").is_err());
    }

    fn write_descriptor(root: &Path, org: &str, module: &str, revision: &str, info: &str) {
        let dir = root.join(org).join(module).join(revision);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("ivy.xml"),
            format!(
                "<ivy-module version=\"2.0\" xmlns:e=\"http://ant.apache.org/ivy/extra\">\
                 {info}</ivy-module>"
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_load_from_disk() {
        let libraries = TempDir::new().unwrap();
        write_descriptor(
            libraries.path(),
            "org.slf4j",
            "slf4j-api",
            "2.0.9",
            "<info e:maven=\"org.slf4j#slf4j-api#2.0.9\" organisation=\"org.slf4j\" \
             module=\"slf4j-api\" revision=\"2.0.9\" status=\"release\"/>",
        );
        write_descriptor(
            libraries.path(),
            "junit",
            "junit",
            "4.13",
            "<info organisation=\"junit\" module=\"junit\" revision=\"4.13\">\
             <maven id=\"junit#junit#4.13\"/></info>",
        );
        write_descriptor(
            libraries.path(),
            "local",
            "thing",
            "1.0",
            "<info organisation=\"local\" module=\"thing\" revision=\"1.0\"/>",
        );

        let mappings = libraries.path().join("mappings.toml");
        fs::write(&mappings, "\"org.slf4j#slf4j-log4j12\" = \"org.slf4j#slf4j-api\"\n").unwrap();

        let mapper = Mapper::load(libraries.path(), &mappings).unwrap();
        assert_eq!(mapper.known().len(), 2);
        assert_eq!(mapper.overrides().len(), 1);
        assert_eq!(lookup(&mapper, "junit#junit#4.13").as_deref(), Some("junit#junit#4.13"));
        assert_eq!(
            lookup(&mapper, "org.slf4j#slf4j-log4j12#2.0.9").as_deref(),
            Some("org.slf4j#slf4j-api#2.0.9")
        );
        assert_eq!(
            mapper
                .get_ivy_marker(&id("junit#junit#4.13"))
                .and_then(Marker::source)
                .map(Identifier::as_string)
                .as_deref(),
            Some("junit#junit#4.13")
        );
    }

    #[test]
    fn test_load_errors() {
        let libraries = TempDir::new().unwrap();
        let missing = libraries.path().join("missing");
        assert!(matches!(
            Mapper::load(&missing, &missing),
            Err(IvyError::NotADirectory { .. })
        ));
        assert!(matches!(
            Mapper::load(libraries.path(), &missing),
            Err(IvyError::Core(CoreError::Config { .. }))
        ));

        write_descriptor(
            libraries.path(),
            "g",
            "a",
            "1.0",
            "<info e:maven=\"g#a#1.0\" organisation=\"g\" module=\"a\"/>",
        );
        let mappings = libraries.path().join("mappings.toml");
        fs::write(&mappings, "").unwrap();
        assert!(matches!(
            Mapper::load(libraries.path(), &mappings),
            Err(IvyError::InvalidLibrary { .. })
        ));
    }
}
