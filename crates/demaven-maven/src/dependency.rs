//! Declared project dependencies.

use crate::error::{MavenError, Result};
use demaven_core::{Identifier, MissingPolicy, Node, PropertyLookup};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Dependency scope as declared in a POM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    System,
    Test,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::System => "system",
            Self::Test => "test",
        }
    }
}

impl FromStr for Scope {
    type Err = MavenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "runtime" => Ok(Self::Runtime),
            "provided" => Ok(Self::Provided),
            "system" => Ok(Self::System),
            "test" => Ok(Self::Test),
            _ => Err(MavenError::InvalidScope {
                scope: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency coordinate with its scope and optionality.
///
/// Equality, hashing and ordering only consider the coordinate.
#[derive(Debug, Clone)]
pub struct Dependency {
    identifier: Identifier,
    scope: Scope,
    optional: bool,
}

impl Dependency {
    pub const fn new(identifier: Identifier, scope: Scope, optional: bool) -> Self {
        Self {
            identifier,
            scope,
            optional,
        }
    }

    /// Reads a `<dependency>` element, evaluating its text against `scope`.
    pub fn from_node(node: &Node, scope: &dyn PropertyLookup) -> Result<Self> {
        let text = |name: &str| node.child_text(name, scope, MissingPolicy::Report);

        let group_id = text("groupId")?.unwrap_or_default();
        let artifact_id = text("artifactId")?.unwrap_or_default();
        let version = text("version")?;
        let identifier = Identifier::new(group_id, artifact_id, version.as_deref())?;

        let scope = match text("scope")? {
            Some(scope) => scope.parse()?,
            None => Scope::Compile,
        };
        let optional = text("optional")?.is_some_and(|o| o.trim().eq_ignore_ascii_case("true"));

        Ok(Self::new(identifier, scope, optional))
    }

    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub const fn scope(&self) -> Scope {
        self.scope
    }

    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the dependency is needed at run time by consumers.
    pub const fn is_required(&self) -> bool {
        !self.optional && matches!(self.scope, Scope::Compile | Scope::Runtime)
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dependency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.identifier.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demaven_core::{CoreError, PropertyContext, parse_xml};

    fn dependency(xml: &str) -> Result<Dependency> {
        let mut context = PropertyContext::new();
        context.insert("slf4j.version", "2.0.9");
        let node = parse_xml(xml, "file:///pom.xml", None).unwrap();
        Dependency::from_node(&node, &context)
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("compile".parse::<Scope>().unwrap(), Scope::Compile);
        assert_eq!(" RUNTIME ".parse::<Scope>().unwrap(), Scope::Runtime);
        assert_eq!("Provided".parse::<Scope>().unwrap(), Scope::Provided);
        assert_eq!("system".parse::<Scope>().unwrap(), Scope::System);
        assert_eq!("test".parse::<Scope>().unwrap(), Scope::Test);
        assert!(matches!(
            "import".parse::<Scope>(),
            Err(MavenError::InvalidScope { ref scope }) if scope == "import"
        ));
        assert_eq!(Scope::default(), Scope::Compile);
    }

    #[test]
    fn test_from_node_defaults() {
        let dep = dependency(
            "<dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId>\
             <version>${slf4j.version}</version></dependency>",
        )
        .unwrap();
        assert_eq!(dep.identifier().as_string(), "org.slf4j#slf4j-api#2.0.9");
        assert_eq!(dep.scope(), Scope::Compile);
        assert!(!dep.is_optional());
        assert!(dep.is_required());
    }

    #[test]
    fn test_from_node_scope_and_optional() {
        let dep = dependency(
            "<dependency><groupId>junit</groupId><artifactId>junit</artifactId>\
             <scope>test</scope><optional>TRUE</optional></dependency>",
        )
        .unwrap();
        assert_eq!(dep.identifier().version(), None);
        assert_eq!(dep.scope(), Scope::Test);
        assert!(dep.is_optional());
        assert!(!dep.is_required());
    }

    #[test]
    fn test_from_node_failures() {
        assert!(matches!(
            dependency("<dependency><artifactId>a</artifactId></dependency>"),
            Err(MavenError::Core(CoreError::MalformedCoordinate { .. }))
        ));
        assert!(matches!(
            dependency("<dependency><groupId>g</groupId><artifactId>a</artifactId><scope>weird</scope></dependency>"),
            Err(MavenError::InvalidScope { .. })
        ));
    }

    #[test]
    fn test_identity_ignores_scope() {
        let id: Identifier = "g#a#1.0".parse().unwrap();
        let compile = Dependency::new(id.clone(), Scope::Compile, false);
        let test = Dependency::new(id, Scope::Test, true);
        assert_eq!(compile, test);

        let other = Dependency::new("g#b#1.0".parse().unwrap(), Scope::Compile, false);
        assert!(compile < other);
    }

    #[test]
    fn test_required_scopes() {
        let id: Identifier = "g#a#1.0".parse().unwrap();
        for (scope, required) in [
            (Scope::Compile, true),
            (Scope::Runtime, true),
            (Scope::Provided, false),
            (Scope::System, false),
            (Scope::Test, false),
        ] {
            assert_eq!(Dependency::new(id.clone(), scope, false).is_required(), required);
        }
    }
}
