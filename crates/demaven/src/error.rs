//! Errors surfaced by the command-line tool.

use demaven_core::CoreError;
use demaven_ivy::IvyError;
use demaven_maven::MavenError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemavenError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Maven(#[from] MavenError),

    #[error(transparent)]
    Ivy(#[from] IvyError),

    #[error("{0}")]
    Usage(String),

    #[error("Unable to locate {coordinate} in the libraries directory")]
    NotMapped { coordinate: String },

    #[error("Ivy file {} already exists, use --force to overwrite", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DemavenError>;
