//! `${...}` property templates.
//!
//! A [`Template`] is parsed once from text such as `"${project.version}-all"`
//! and evaluated against anything implementing [`PropertyLookup`]. A reference
//! body is a dotted path; evaluation tries, in order:
//!
//! 1. the whole dotted path as a single key (`slf4j.version`),
//! 2. a walk through the path, one [`PropertyLookup::lookup`] per token
//!    (`project.parent.version`),
//! 3. the process environment, keyed by the whole path,
//! 4. the [`MissingPolicy`].
//!
//! Lookups are a closed capability: types expose exactly the names they
//! register in their `lookup` implementation, nothing else is reachable.

use crate::error::{CoreError, Result};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// A value reachable from a template reference.
pub enum Value<'a> {
    Text(Cow<'a, str>),
    Object(&'a dyn PropertyLookup),
}

impl<'a> Value<'a> {
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Text(text.into())
    }

    /// Renders the value as a string, if it has a textual form.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.into_owned()),
            Self::Object(object) => object.describe(),
        }
    }
}

/// Keyed lookup of named properties.
///
/// Implemented by property maps (subscript by key) and by domain types that
/// expose a fixed set of fields to templates.
pub trait PropertyLookup {
    fn lookup(&self, name: &str) -> Option<Value<'_>>;

    /// Textual form used when a reference resolves to the object itself.
    fn describe(&self) -> Option<String> {
        None
    }
}

impl PropertyLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        self.get(name).map(|v| Value::text(v.as_str()))
    }
}

impl PropertyLookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        self.get(name).map(|v| Value::text(v.as_str()))
    }
}

/// What to do with a reference nothing can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Keep the `${path}` text unchanged.
    Ignore,
    /// Log an error and yield no value.
    #[default]
    Report,
    /// Fail with [`CoreError::UnresolvedProperty`].
    Fail,
}

/// One entry of a [`PropertyContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Text(String),
    /// Resolves to the object the context is scoped to (`project`, `pom`).
    This,
}

/// Ordered name to value mapping used to resolve templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyContext {
    entries: BTreeMap<String, Property>,
}

impl PropertyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Property::Text(value.into()));
    }

    pub fn insert_self(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), Property::This);
    }

    pub fn remove(&mut self, key: &str) -> Option<Property> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.entries.get(key)
    }

    /// Returns the textual value of `key`, ignoring self references.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(Property::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Merges `other` into this context, `other` winning on identical keys.
    pub fn extend(&mut self, other: &Self) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binds the context's self references to `this`.
    pub fn scope<'a>(&'a self, this: &'a dyn PropertyLookup) -> Scope<'a> {
        Scope {
            properties: self,
            this: Some(this),
        }
    }
}

impl PropertyLookup for PropertyContext {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        self.get_text(name).map(Value::text)
    }
}

/// A [`PropertyContext`] whose self references point at a concrete object.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    properties: &'a PropertyContext,
    this: Option<&'a dyn PropertyLookup>,
}

impl PropertyLookup for Scope<'_> {
    fn lookup(&self, name: &str) -> Option<Value<'_>> {
        match self.properties.get(name)? {
            Property::Text(text) => Some(Value::text(text.as_str())),
            Property::This => self.this.map(Value::Object),
        }
    }
}

/// A single `${...}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    path: String,
    tokens: Vec<String>,
    location: String,
}

impl Reference {
    fn parse(body: &str, template: &str, location: &str) -> Result<Self> {
        let tokens: Vec<String> = body
            .split('.')
            .filter(|token| !token.is_empty())
            .map(|token| token.trim().to_string())
            .collect();

        if tokens.is_empty() || tokens.iter().any(String::is_empty) {
            return Err(CoreError::EmptyReference {
                template: template.to_string(),
                body: body.to_string(),
            });
        }

        Ok(Self {
            path: tokens.join("."),
            tokens,
            location: location.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn evaluate(&self, scope: &dyn PropertyLookup, policy: MissingPolicy) -> Result<Option<String>> {
        if let Some(text) = scope.lookup(&self.path).and_then(Value::into_text) {
            return Ok(Some(text));
        }

        let mut current = Some(Value::Object(scope));
        for token in &self.tokens {
            current = match current {
                Some(Value::Object(object)) => object.lookup(token),
                _ => None,
            };
        }
        if let Some(text) = current.and_then(Value::into_text) {
            return Ok(Some(text));
        }

        if let Ok(text) = std::env::var(&self.path) {
            return Ok(Some(text));
        }

        match policy {
            MissingPolicy::Ignore => Ok(Some(format!("${{{}}}", self.path))),
            MissingPolicy::Report => {
                tracing::error!("Unable to resolve ${{{}}} found in {}", self.path, self.location);
                Ok(None)
            }
            MissingPolicy::Fail => Err(CoreError::UnresolvedProperty {
                path: self.path.clone(),
                location: self.location.clone(),
            }),
        }
    }
}

/// A parsed template: literal text interleaved with references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Empty,
    Literal(String),
    Reference(Reference),
    Concat(Vec<Template>),
}

impl Template {
    /// Parses `text`; `location` names the source document in diagnostics.
    pub fn parse(text: &str, location: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            let body_start = start + 2;
            let Some(length) = rest[body_start..].find('}') else {
                return Err(CoreError::UnterminatedTemplate {
                    template: text.to_string(),
                });
            };

            if start > 0 {
                parts.push(Self::Literal(rest[..start].to_string()));
            }
            let body = &rest[body_start..body_start + length];
            parts.push(Self::Reference(Reference::parse(body, text, location)?));
            rest = &rest[body_start + length + 1..];
        }
        if !rest.is_empty() {
            parts.push(Self::Literal(rest.to_string()));
        }

        Ok(match parts.len() {
            0 => Self::Empty,
            1 => parts.remove(0),
            _ => Self::Concat(parts),
        })
    }

    /// Parses and evaluates `text` in one step.
    pub fn resolve(
        text: &str,
        location: &str,
        scope: &dyn PropertyLookup,
        policy: MissingPolicy,
    ) -> Result<Option<String>> {
        Self::parse(text, location)?.evaluate(scope, policy)
    }

    /// Evaluates the template.
    ///
    /// Under [`MissingPolicy::Report`] an unresolved reference yields
    /// `Ok(None)` on its own and contributes nothing inside a longer
    /// template, whose literals are kept.
    pub fn evaluate(&self, scope: &dyn PropertyLookup, policy: MissingPolicy) -> Result<Option<String>> {
        match self {
            Self::Empty => Ok(Some(String::new())),
            Self::Literal(text) => Ok(Some(text.clone())),
            Self::Reference(reference) => reference.evaluate(scope, policy),
            Self::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    if let Some(text) = part.evaluate(scope, policy)? {
                        out.push_str(&text);
                    }
                }
                Ok(Some(out))
            }
        }
    }

    /// References contained in the template, in order of appearance.
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            Self::Empty | Self::Literal(_) => vec![],
            Self::Reference(reference) => vec![reference],
            Self::Concat(parts) => parts.iter().flat_map(Self::references).collect(),
        }
    }
}
