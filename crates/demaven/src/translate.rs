//! The translate pipeline: resolve, map, build and optionally write.

use crate::config::Config;
use crate::error::{DemavenError, Result};
use demaven_core::{Fetcher, Identifier, LicenseRegistry};
use demaven_ivy::{Descriptor, Mapper, Marker, to_xml};
use demaven_maven::Repository;
use std::path::PathBuf;
use std::sync::Arc;

/// What to translate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Maven coordinate, or with `update` an already mapped one.
    pub coordinate: String,
    /// Explicit `organisation#module[#revision]` for the descriptor.
    pub translation: Option<String>,
    /// Re-translate the latest Maven version of an already mapped library.
    pub update: bool,
}

pub struct Translator {
    libraries_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    repository: Repository,
    mapper: Mapper,
}

impl Translator {
    /// Loads the license registry and scans the libraries directory named
    /// by `config`.
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let licenses = LicenseRegistry::load(&config.licenses_file)?;
        let mapper = Mapper::load(&config.libraries_dir, &config.mappings_file)?;
        let repository = Repository::new(
            config.maven_url.clone(),
            Arc::clone(&fetcher),
            Arc::new(licenses),
        );
        Ok(Self {
            libraries_dir: config.libraries_dir.clone(),
            fetcher,
            repository,
            mapper,
        })
    }

    pub const fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Builds the descriptor for `request`.
    pub async fn translate(&self, request: &Request) -> Result<Descriptor> {
        let identifier: Identifier = request.coordinate.parse()?;

        let (project, translation) = if request.update {
            let not_mapped = || DemavenError::NotMapped {
                coordinate: request.coordinate.clone(),
            };
            let latest = self.mapper.get_latest(&identifier).ok_or_else(not_mapped)?;
            let source = latest.source().ok_or_else(not_mapped)?;
            tracing::info!("Updating {} from {}", latest, source);

            let project = self.repository.get_project(&source.unversioned()).await?;
            let translation = match &request.translation {
                Some(translation) => translation.clone(),
                None => format!("{}#{}", latest.organisation(), latest.module()),
            };
            let marker = Marker::parse(Some(project.identifier().clone()), &translation)?;
            (project, Some(marker))
        } else {
            let project = self.repository.get_project(&identifier).await?;
            let marker = request
                .translation
                .as_deref()
                .map(|t| Marker::parse(Some(project.identifier().clone()), t))
                .transpose()?;
            (project, marker)
        };

        let descriptor =
            Descriptor::build(&project, &self.mapper, self.fetcher.as_ref(), translation.as_ref())
                .await?;
        tracing::info!("Translated Maven {} to Ivy {}", project, descriptor.marker());

        if descriptor.licenses().is_empty() {
            tracing::warn!("No licenses found for {}", descriptor.marker());
        }
        if descriptor.artifacts().is_empty() {
            tracing::warn!("No artifacts found for {}", descriptor.marker());
        }
        Ok(descriptor)
    }

    /// Where `descriptor` lives in the libraries directory.
    pub fn descriptor_path(&self, descriptor: &Descriptor) -> PathBuf {
        let marker = descriptor.marker();
        self.libraries_dir
            .join(marker.organisation())
            .join(marker.module())
            .join(marker.revision().to_string())
            .join("ivy.xml")
    }

    /// Writes `descriptor` into the libraries directory.
    ///
    /// An existing file is only replaced when `force` is set.
    pub async fn write(&self, descriptor: &Descriptor, force: bool) -> Result<PathBuf> {
        let path = self.descriptor_path(descriptor);
        let io_error = |source| DemavenError::Io {
            path: path.clone(),
            source,
        };

        if tokio::fs::try_exists(&path).await.map_err(io_error)? {
            if !force {
                return Err(DemavenError::AlreadyExists { path: path.clone() });
            }
            tracing::warn!("Overwriting {}", path.display());
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, to_xml(descriptor))
            .await
            .map_err(io_error)?;

        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }
}
