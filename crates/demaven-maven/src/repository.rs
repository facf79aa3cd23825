//! Maven repository client with a per-run project memo.

use crate::error::{MavenError, Result};
use crate::project::Project;
use dashmap::DashMap;
use demaven_core::{CoreError, Fetcher, Identifier, LicenseRegistry, Node, Url};
use futures::future::BoxFuture;
use std::sync::Arc;

/// A Maven repository rooted at a base URL.
///
/// Projects are resolved at most once per coordinate for the lifetime of the
/// repository; versions looked up from `maven-metadata.xml` are remembered
/// the same way.
pub struct Repository {
    base: Url,
    fetcher: Arc<dyn Fetcher>,
    licenses: Arc<LicenseRegistry>,
    projects: DashMap<Identifier, Arc<Project>>,
    versions: DashMap<Identifier, String>,
}

impl Repository {
    pub fn new(mut base: Url, fetcher: Arc<dyn Fetcher>, licenses: Arc<LicenseRegistry>) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            fetcher,
            licenses,
            projects: DashMap::new(),
            versions: DashMap::new(),
        }
    }

    pub const fn base(&self) -> &Url {
        &self.base
    }

    pub fn fetcher(&self) -> Arc<dyn Fetcher> {
        Arc::clone(&self.fetcher)
    }

    fn resolve_path(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| {
            MavenError::Core(CoreError::InvalidUrl {
                url: format!("{}{path}", self.base),
                message: e.to_string(),
            })
        })
    }

    fn artifact_path(identifier: &Identifier) -> String {
        format!(
            "{}/{}/",
            identifier.group_id().replace('.', "/"),
            identifier.artifact_id()
        )
    }

    /// Location of the POM for a versioned coordinate.
    pub fn pom_url(&self, identifier: &Identifier) -> Result<Url> {
        let Some(version) = identifier.version() else {
            return Err(MavenError::MissingVersion {
                identifier: identifier.as_string(),
            });
        };
        let artifact = identifier.artifact_id();
        self.resolve_path(&format!(
            "{}{version}/{artifact}-{version}.pom",
            Self::artifact_path(identifier)
        ))
    }

    /// Location of the metadata document listing all versions.
    pub fn metadata_url(&self, identifier: &Identifier) -> Result<Url> {
        self.resolve_path(&format!("{}maven-metadata.xml", Self::artifact_path(identifier)))
    }

    /// Latest version of `identifier`, ignoring any version it carries.
    ///
    /// The metadata's `<release>` wins; otherwise the last listed version is
    /// used.
    pub async fn latest_version(&self, identifier: &Identifier) -> Result<String> {
        let key = identifier.unversioned();
        if let Some(version) = self.versions.get(&key).map(|v| v.value().clone()) {
            return Ok(version);
        }

        let url = self.metadata_url(&key)?;
        tracing::info!("Resolving latest version of {} from {}", key, url);
        let metadata = self.fetcher.fetch(&url).await?.parse_xml()?;
        if metadata.name() != "metadata" {
            return Err(MavenError::DocumentFormat {
                location: url.to_string(),
                expected: "metadata",
                found: metadata.name().to_string(),
            });
        }

        let versioning = metadata.child("versioning");
        let release = versioning
            .and_then(|v| v.child("release"))
            .map(Node::text)
            .filter(|v| !v.is_empty());
        let version = release
            .or_else(|| {
                versioning
                    .and_then(|v| v.child("versions"))
                    .and_then(|v| {
                        v.children_named("version")
                            .map(Node::text)
                            .filter(|v| !v.is_empty())
                            .last()
                    })
            })
            .map(str::to_string)
            .ok_or_else(|| MavenError::NoVersion {
                identifier: key.as_string(),
            })?;

        tracing::debug!("Latest version of {} is {}", key, version);
        self.versions.insert(key, version.clone());
        Ok(version)
    }

    /// Resolves the project for `identifier`, looking up the latest version
    /// when none is given.
    pub async fn get_project(&self, identifier: &Identifier) -> Result<Arc<Project>> {
        let mut chain = Vec::new();
        self.resolve(identifier.clone(), &mut chain).await
    }

    fn resolve<'a>(
        &'a self,
        identifier: Identifier,
        chain: &'a mut Vec<Identifier>,
    ) -> BoxFuture<'a, Result<Arc<Project>>> {
        Box::pin(async move {
            let identifier = match identifier.version() {
                Some(_) => identifier,
                None => {
                    let version = self.latest_version(&identifier).await?;
                    identifier.with_version(version)?
                }
            };

            if let Some(project) = self.projects.get(&identifier).map(|p| Arc::clone(p.value())) {
                return Ok(project);
            }
            if chain.contains(&identifier) {
                let chain = chain
                    .iter()
                    .chain(std::iter::once(&identifier))
                    .map(Identifier::as_string)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(MavenError::ParentCycle { chain });
            }

            let url = self.pom_url(&identifier)?;
            tracing::info!("Parsing {}", url);
            let node = self.fetcher.fetch(&url).await?.parse_xml()?;

            let parent = match Project::parent_identifier(&node, &identifier)? {
                Some(parent) => {
                    chain.push(identifier.clone());
                    let resolved = self.resolve(parent, chain).await;
                    chain.pop();
                    Some(resolved?)
                }
                None => None,
            };

            let project = Arc::new(Project::assemble(
                identifier.clone(),
                &node,
                parent.as_deref(),
                &self.licenses,
            )?);
            self.projects.insert(identifier, Arc::clone(&project));
            Ok(project)
        })
    }

    /// Number of projects resolved so far.
    pub fn cached_projects(&self) -> usize {
        self.projects.len()
    }
}
