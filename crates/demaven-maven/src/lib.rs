//! Maven project resolution.
//!
//! Resolves a coordinate to a [`Project`]: the POM folded over its parent
//! chain, with properties evaluated, dependencies collected and licenses
//! matched against a [`LicenseRegistry`](demaven_core::LicenseRegistry).

pub mod dependency;
pub mod error;
pub mod project;
pub mod repository;

pub use dependency::{Dependency, Scope};
pub use error::{MavenError, Result};
pub use project::Project;
pub use repository::Repository;
