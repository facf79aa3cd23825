//! Fully inherited view of a POM.

use crate::dependency::Dependency;
use crate::error::{MavenError, Result};
use chrono::{DateTime, Utc};
use demaven_core::{
    CoreError, Identifier, License, LicenseRegistry, MissingPolicy, Node, PropertyContext,
    PropertyLookup, Template, Url, Value, normalize_whitespace,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

const POLICY: MissingPolicy = MissingPolicy::Report;

/// Fields a project exposes to `${project.*}` and `${pom.*}` references.
#[derive(Clone, Copy)]
struct SelfView<'a> {
    identifier: &'a Identifier,
    parent: Option<&'a Identifier>,
    url: Option<&'a str>,
    name: Option<&'a str>,
    description: Option<&'a str>,
}

impl PropertyLookup for SelfView<'_> {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "groupId" => Some(Value::text(self.identifier.group_id())),
            "artifactId" => Some(Value::text(self.identifier.artifact_id())),
            "version" => self.identifier.version().map(Value::text),
            "parent" => self.parent.map(|p| Value::Object(p)),
            "url" => self.url.map(Value::text),
            "name" => self.name.map(Value::text),
            "description" => self.description.map(Value::text),
            _ => None,
        }
    }

    fn describe(&self) -> Option<String> {
        Some(self.identifier.as_string())
    }
}

/// A resolved project: its own POM folded over its parent chain.
///
/// Built once per coordinate by the [`Repository`](crate::Repository) and
/// never modified afterwards.
#[derive(Debug, Clone)]
pub struct Project {
    identifier: Identifier,
    parent: Option<Identifier>,
    properties: PropertyContext,
    dependencies: Vec<Dependency>,
    licenses: BTreeMap<Arc<License>, Option<String>>,
    last_modified: Option<DateTime<Utc>>,
    url: Option<String>,
    name: Option<String>,
    description: Option<String>,
    pom_url: Url,
    jar_url: Url,
    sources_url: Url,
    javadoc_url: Url,
}

impl Project {
    /// Reads the parent coordinate declared by a POM, if any.
    ///
    /// Parent coordinates are evaluated before any inherited property is
    /// known, so only the project's own coordinate is in scope.
    pub fn parent_identifier(node: &Node, identifier: &Identifier) -> Result<Option<Identifier>> {
        let Some(parent) = node.child("parent") else {
            return Ok(None);
        };

        let mut context = PropertyContext::new();
        context.insert("groupId", identifier.group_id());
        context.insert("artifactId", identifier.artifact_id());
        if let Some(version) = identifier.version() {
            context.insert("version", version);
        }
        context.insert_self("project");
        context.insert_self("pom");
        let scope = context.scope(identifier);

        let text = |name: &str| parent.child_text(name, &scope, POLICY);
        let group_id = text("groupId")?.unwrap_or_default();
        let artifact_id = text("artifactId")?.unwrap_or_default();
        let version = text("version")?;

        Ok(Some(Identifier::new(group_id, artifact_id, version.as_deref())?))
    }

    /// Builds a project from its POM tree and its already resolved parent.
    ///
    /// `identifier` must carry the resolved version. The fold seeds
    /// properties, licenses and dependencies from `parent`, then overlays the
    /// local declarations.
    pub fn assemble(
        identifier: Identifier,
        node: &Node,
        parent: Option<&Self>,
        registry: &LicenseRegistry,
    ) -> Result<Self> {
        if node.name() != "project" {
            return Err(MavenError::DocumentFormat {
                location: node.location().to_string(),
                expected: "project",
                found: node.name().to_string(),
            });
        }
        let Some(version) = identifier.version() else {
            return Err(MavenError::MissingVersion {
                identifier: identifier.as_string(),
            });
        };

        let location = node.location();
        let pom_url = Url::parse(location).map_err(|e| CoreError::InvalidUrl {
            url: location.to_string(),
            message: e.to_string(),
        })?;
        let artifact = |suffix: &str| {
            let file = format!("{}-{}{}", identifier.artifact_id(), version, suffix);
            pom_url.join(&file).map_err(|e| CoreError::InvalidUrl {
                url: file,
                message: e.to_string(),
            })
        };
        let jar_url = artifact(".jar")?;
        let sources_url = artifact("-sources.jar")?;
        let javadoc_url = artifact("-javadoc.jar")?;

        let mut properties = PropertyContext::new();
        let mut licenses = BTreeMap::new();
        let mut dependencies = Vec::new();
        let mut inherited_url = None;
        let mut inherited_name = None;
        let mut inherited_description = None;

        if let Some(parent) = parent {
            tracing::debug!("Inheriting from {} into {}", parent.identifier, identifier);
            properties.extend(&parent.properties);
            licenses.clone_from(&parent.licenses);
            dependencies.clone_from(&parent.dependencies);
            inherited_url.clone_from(&parent.url);
            inherited_name = parent.name.as_deref().map(normalize_whitespace);
            inherited_description = parent.description.as_deref().map(normalize_whitespace);
        }
        properties.insert_self("project");
        properties.insert_self("pom");

        let parent_identifier = parent.map(|p| p.identifier.clone());
        let inherited = SelfView {
            identifier: &identifier,
            parent: parent_identifier.as_ref(),
            url: inherited_url.as_deref(),
            name: inherited_name.as_deref(),
            description: inherited_description.as_deref(),
        };

        let coordinate = [
            ("groupId", identifier.group_id()),
            ("artifactId", identifier.artifact_id()),
            ("version", version),
        ];
        for (key, value) in coordinate {
            properties.insert(key, value);
        }

        for section in node.children_named("properties") {
            for property in section.children() {
                let value = {
                    let scope = properties.scope(&inherited);
                    Template::resolve(property.text(), location, &scope, POLICY)?
                };
                match value {
                    Some(value) => properties.insert(property.name(), value),
                    None => {
                        properties.remove(property.name());
                    }
                }
            }
        }

        for (key, value) in coordinate {
            if !properties.contains_key(key) {
                properties.insert(key, value);
            }
        }

        let (url, name, description) = {
            let scope = properties.scope(&inherited);
            let url = node.child_text("url", &scope, POLICY)?.or(inherited_url.clone());
            let name = node
                .child_text("name", &scope, POLICY)?
                .map(|n| normalize_whitespace(&n))
                .or(inherited_name.clone());
            let description = node
                .child_text("description", &scope, POLICY)?
                .map(|d| normalize_whitespace(&d))
                .or(inherited_description.clone());
            (url, name, description)
        };

        let view = SelfView {
            identifier: &identifier,
            parent: parent_identifier.as_ref(),
            url: url.as_deref(),
            name: name.as_deref(),
            description: description.as_deref(),
        };
        let scope = properties.scope(&view);

        for section in node.children_named("dependencies") {
            for element in section.children() {
                let dependency = Dependency::from_node(element, &scope).map_err(|e| {
                    MavenError::InvalidDependency {
                        project: identifier.as_string(),
                        source: Box::new(e),
                    }
                })?;
                match dependencies.iter_mut().find(|d| **d == dependency) {
                    Some(existing) => *existing = dependency,
                    None => dependencies.push(dependency),
                }
            }
        }

        for section in node.children_named("licenses") {
            for element in section.children() {
                let declared_url = element
                    .child_text("url", &scope, POLICY)?
                    .map(|u| normalize_whitespace(&u));
                let declared_name = element.child_text("name", &scope, POLICY)?;
                let license = resolve_license(
                    &identifier,
                    registry,
                    declared_url.as_deref(),
                    declared_name.as_deref(),
                )?;
                let location_override = declared_url
                    .filter(|u| !u.eq_ignore_ascii_case(license.location()));
                licenses.insert(license, location_override);
            }
        }

        Ok(Self {
            identifier,
            parent: parent_identifier,
            properties,
            dependencies,
            licenses,
            last_modified: node.last_modified(),
            url,
            name,
            description,
            pom_url,
            jar_url,
            sources_url,
            javadoc_url,
        })
    }

    fn view(&self) -> SelfView<'_> {
        SelfView {
            identifier: &self.identifier,
            parent: self.parent.as_ref(),
            url: self.url.as_deref(),
            name: self.name.as_deref(),
            description: self.description.as_deref(),
        }
    }

    /// The project coordinate, always versioned.
    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn group_id(&self) -> &str {
        self.identifier.group_id()
    }

    pub fn artifact_id(&self) -> &str {
        self.identifier.artifact_id()
    }

    pub fn version(&self) -> &str {
        self.identifier.version().unwrap_or_default()
    }

    pub const fn parent(&self) -> Option<&Identifier> {
        self.parent.as_ref()
    }

    pub const fn properties(&self) -> &PropertyContext {
        &self.properties
    }

    /// Declared dependencies, inherited ones first, in document order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Licenses, each with the declared URL when it differs from the
    /// canonical one.
    pub const fn licenses(&self) -> &BTreeMap<Arc<License>, Option<String>> {
        &self.licenses
    }

    pub const fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Home page.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub const fn pom_url(&self) -> &Url {
        &self.pom_url
    }

    pub const fn jar_url(&self) -> &Url {
        &self.jar_url
    }

    pub const fn sources_url(&self) -> &Url {
        &self.sources_url
    }

    pub const fn javadoc_url(&self) -> &Url {
        &self.javadoc_url
    }

    /// Evaluates `text` against this project's properties.
    pub fn evaluate(&self, text: &str, policy: MissingPolicy) -> Result<Option<String>> {
        let view = self.view();
        let scope = self.properties.scope(&view);
        Ok(Template::resolve(text, self.pom_url.as_str(), &scope, policy)?)
    }
}

fn resolve_license(
    identifier: &Identifier,
    registry: &LicenseRegistry,
    url: Option<&str>,
    name: Option<&str>,
) -> Result<Arc<License>> {
    if let Some(url) = url {
        match registry.by_location(url) {
            Ok(license) => return Ok(license),
            Err(_) => tracing::warn!("License for {} not found by URL {}", identifier, url),
        }
    }
    if let Some(name) = name {
        match registry.by_name(name) {
            Ok(license) => return Ok(license),
            Err(_) => tracing::warn!("License for {} not found by name {}", identifier, name),
        }
    }
    Err(MavenError::UnresolvedLicense {
        project: identifier.as_string(),
        name: name.map(str::to_string),
        url: url.map(str::to_string),
    })
}

impl PropertyLookup for Project {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "groupId" => Some(Value::text(self.group_id())),
            "artifactId" => Some(Value::text(self.artifact_id())),
            "version" => Some(Value::text(self.version())),
            "parent" => self.parent.as_ref().map(|p| Value::Object(p)),
            "url" => self.url().map(Value::text),
            "name" => self.name().map(Value::text),
            "description" => self.description().map(Value::text),
            _ => None,
        }
    }

    fn describe(&self) -> Option<String> {
        Some(self.identifier.as_string())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.identifier.fmt(f)
    }
}
