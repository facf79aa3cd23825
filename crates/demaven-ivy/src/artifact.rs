use std::fmt;

/// Kinds of artifact published alongside a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactType {
    Bin,
    Src,
    Doc,
}

impl ArtifactType {
    pub const ALL: [Self; 3] = [Self::Bin, Self::Src, Self::Doc];

    /// Ivy artifact type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Src => "src",
            Self::Doc => "doc",
        }
    }

    /// Ivy artifact extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Bin => "jar",
            Self::Src | Self::Doc => "zip",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
