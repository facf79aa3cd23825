//! Errors raised on the Ivy side of the translation.

use crate::marker::Marker;
use demaven_core::CoreError;
use demaven_maven::{Dependency, MavenError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IvyError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Maven(#[from] MavenError),

    #[error("Invalid revision '{revision}': {reason}")]
    MalformedRevision { revision: String, reason: String },

    #[error("Invalid marker '{marker}': {reason}")]
    MalformedMarker { marker: String, reason: String },

    #[error("Organisation/module mismatch comparing versions for {marker} and {found}")]
    InconsistentLatestMapping { marker: String, found: String },

    #[error("Unresolved dependencies for {marker}")]
    MissingDependencies {
        marker: Marker,
        missing: Vec<Dependency>,
    },

    #[error("Invalid library descriptor {}: {message}", path.display())]
    InvalidLibrary { path: PathBuf, message: String },

    #[error("Invalid directory {}", path.display())]
    NotADirectory { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, IvyError>;
