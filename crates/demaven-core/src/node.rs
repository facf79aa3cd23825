//! Attributed XML element tree.
//!
//! POM files, Maven metadata and Ivy descriptors are small, so they are read
//! fully into a [`Node`] tree rather than processed as a stream.

use crate::error::{CoreError, Result};
use crate::template::{MissingPolicy, PropertyLookup, Template};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;

/// An XML element.
///
/// Names are local names: namespace prefixes are stripped from both elements
/// and attributes. Every node remembers the location and last-modified time of
/// the document it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
    text: String,
    location: String,
    last_modified: Option<DateTime<Utc>>,
}

impl Node {
    fn from_start(
        start: &BytesStart<'_>,
        location: &str,
        last_modified: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();

        let mut attributes = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(location, e))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let raw = String::from_utf8_lossy(&attr.value).to_string();
            let value = quick_xml::escape::unescape(&raw)
                .map(|c| c.into_owned())
                .unwrap_or(raw);
            attributes.insert(key, value);
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
            location: location.to_string(),
            last_modified,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Concatenated text content of this element, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Evaluates the text of child `name` as a template.
    ///
    /// Absent children and empty text both yield `Ok(None)`.
    pub fn child_text(
        &self,
        name: &str,
        scope: &dyn PropertyLookup,
        policy: MissingPolicy,
    ) -> Result<Option<String>> {
        match self.child(name).map(Node::text) {
            Some(text) if !text.is_empty() => {
                let value = Template::resolve(text, &self.location, scope, policy)?;
                Ok(value.filter(|v| !v.is_empty()))
            }
            _ => Ok(None),
        }
    }
}

fn xml_error(location: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::Xml {
        location: location.to_string(),
        message: err.to_string(),
    }
}

/// Parses `content` into its root element.
pub fn parse_xml(
    content: &str,
    location: &str,
    last_modified: Option<DateTime<Utc>>,
) -> Result<Node> {
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|e| xml_error(location, e))?;

        match event {
            Event::Start(ref e) => {
                stack.push(Node::from_start(e, location, last_modified)?);
            }
            Event::Empty(ref e) => {
                let node = Node::from_start(e, location, last_modified)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::End(_) => {
                let Some(node) = stack.pop() else {
                    return Err(xml_error(location, "unbalanced closing tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(ref e) => {
                if let Some(node) = stack.last_mut() {
                    let text = e.decode().map_err(|e| xml_error(location, e))?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::GeneralRef(ref e) => {
                if let Some(node) = stack.last_mut() {
                    if let Some(ch) = e.resolve_char_ref().map_err(|e| xml_error(location, e))? {
                        node.text.push(ch);
                    } else {
                        let name = e.decode().map_err(|e| xml_error(location, e))?;
                        let Some(value) = quick_xml::escape::resolve_predefined_entity(&name) else {
                            return Err(xml_error(location, format!("unknown entity '&{name};'")));
                        };
                        node.text.push_str(value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_error(location, "unexpected end of document"));
    }
    root.ok_or_else(|| xml_error(location, "document has no root element"))
}
