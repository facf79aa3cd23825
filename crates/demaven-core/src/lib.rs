//! Core building blocks shared by the demaven crates.
//!
//! This crate holds the pieces that know nothing about either Maven or Ivy
//! semantics: coordinates, `${...}` templates and their property contexts, the
//! XML element tree, the document fetcher and the license registry.

pub mod error;
pub mod fetch;
pub mod identifier;
pub mod license;
pub mod node;
pub mod template;
pub mod text;

pub use error::{CoreError, Result};
pub use fetch::{Document, Fetcher, HttpFetcher, parse_http_date};
pub use identifier::Identifier;
pub use license::{License, LicenseRegistry};
pub use node::{Node, parse_xml};
pub use template::{
    MissingPolicy, Property, PropertyContext, PropertyLookup, Reference, Scope, Template, Value,
};
pub use text::normalize_whitespace;

// Re-exported so downstream crates share one URL type with the fetcher.
pub use reqwest::Url;
