//! Core error types shared by every demaven crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid coordinate '{input}': {reason}")]
    MalformedCoordinate { input: String, reason: String },

    #[error("Unterminated expression in '{template}'")]
    UnterminatedTemplate { template: String },

    #[error("Invalid expression '${{{body}}}' in '{template}'")]
    EmptyReference { template: String, body: String },

    #[error("Unable to resolve ${{{path}}} found in {location}")]
    UnresolvedProperty { path: String, location: String },

    #[error("Invalid license location '{location}'")]
    UnknownLicenseLocation { location: String },

    #[error("Invalid license name '{name}'")]
    UnknownLicenseName { name: String },

    #[error("Failed to parse XML document {location}: {message}")]
    Xml { location: String, message: String },

    #[error("Request for {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request for {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Configuration error in {location}: {message}")]
    Config { location: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCoordinate {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
