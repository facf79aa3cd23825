//! Errors raised while resolving Maven projects.

use demaven_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MavenError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Expected <{expected}/> in {location}, found <{found}/>")]
    DocumentFormat {
        location: String,
        expected: &'static str,
        found: String,
    },

    #[error("Version unknown for {identifier}")]
    MissingVersion { identifier: String },

    #[error("Unable to get version for {identifier}")]
    NoVersion { identifier: String },

    #[error("Invalid dependency scope '{scope}'")]
    InvalidScope { scope: String },

    #[error("Invalid dependency in {project}: {source}")]
    InvalidDependency {
        project: String,
        #[source]
        source: Box<MavenError>,
    },

    #[error("No license found for {project} (name={name:?}, url={url:?})")]
    UnresolvedLicense {
        project: String,
        name: Option<String>,
        url: Option<String>,
    },

    #[error("Parent cycle detected: {chain}")]
    ParentCycle { chain: String },
}

pub type Result<T> = std::result::Result<T, MavenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MavenError::DocumentFormat {
            location: "file:///a.pom".into(),
            expected: "project",
            found: "metadata".into(),
        };
        assert_eq!(
            err.to_string(),
            "Expected <project/> in file:///a.pom, found <metadata/>"
        );

        let err = MavenError::UnresolvedLicense {
            project: "g#a#1.0".into(),
            name: Some("Proprietary".into()),
            url: None,
        };
        assert!(err.to_string().contains("g#a#1.0"));
        assert!(err.to_string().contains("Proprietary"));
    }

    #[test]
    fn test_dependency_error_chains_source() {
        let err = MavenError::InvalidDependency {
            project: "g#a#1.0".into(),
            source: Box::new(MavenError::InvalidScope {
                scope: "bogus".into(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "Invalid dependency in g#a#1.0: Invalid dependency scope 'bogus'"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_core_error_conversion() {
        let core = CoreError::UnterminatedTemplate {
            template: "${".into(),
        };
        let err: MavenError = core.into();
        assert!(matches!(err, MavenError::Core(CoreError::UnterminatedTemplate { .. })));
        assert_eq!(err.to_string(), "Unterminated expression in '${'");
    }
}
