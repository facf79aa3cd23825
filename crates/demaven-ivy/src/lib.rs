//! Ivy side of the translation.
//!
//! Maps Maven coordinates onto the Ivy [`Marker`]s already present in a
//! libraries directory, builds a [`Descriptor`] from a resolved project and
//! renders it as `ivy.xml`.

pub mod artifact;
pub mod descriptor;
pub mod error;
pub mod mapper;
pub mod marker;
pub mod revision;
pub mod serializer;

pub use artifact::ArtifactType;
pub use descriptor::Descriptor;
pub use error::{IvyError, Result};
pub use mapper::{Mapper, parse_overrides};
pub use marker::Marker;
pub use revision::Revision;
pub use serializer::{IvyXml, to_xml};
