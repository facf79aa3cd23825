//! Ivy descriptor built from a resolved Maven project.

use crate::artifact::ArtifactType;
use crate::error::{IvyError, Result};
use crate::mapper::Mapper;
use crate::marker::Marker;
use chrono::{DateTime, Utc};
use demaven_core::{Fetcher, License, Url};
use demaven_maven::{Dependency, Project};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The translated form of a [`Project`].
#[derive(Debug, Clone)]
pub struct Descriptor {
    marker: Marker,
    maven_id: String,
    publication: DateTime<Utc>,
    home_page: Option<String>,
    description: Option<String>,
    licenses: BTreeMap<Arc<License>, Option<String>>,
    dependencies: BTreeMap<Marker, Dependency>,
    optional_dependencies: BTreeMap<Dependency, Option<Marker>>,
    artifacts: BTreeMap<ArtifactType, Url>,
}

impl Descriptor {
    /// Translates `project`.
    ///
    /// The descriptor is identified by `translation` when given, otherwise by
    /// the project's own coordinate. Required dependencies (compile or
    /// runtime scope, not optional) must all map to a known marker; every
    /// unmapped one is collected before failing with
    /// [`IvyError::MissingDependencies`]. Other dependencies are recorded
    /// with whatever marker the mapper has for them.
    ///
    /// Artifacts are probed through `fetcher`; the ones that cannot be
    /// confirmed are left out.
    pub async fn build(
        project: &Project,
        mapper: &Mapper,
        fetcher: &dyn Fetcher,
        translation: Option<&Marker>,
    ) -> Result<Self> {
        let source = Some(project.identifier().clone());
        let marker = match translation {
            Some(t) => Marker::new(
                source,
                t.organisation(),
                t.module(),
                &t.revision().to_string(),
            )?,
            None => Marker::new(
                source,
                project.group_id(),
                project.artifact_id(),
                project.version(),
            )?,
        };

        let mut dependencies = BTreeMap::new();
        let mut optional_dependencies = BTreeMap::new();
        let mut missing = Vec::new();

        for dependency in project.dependencies() {
            let mapped = mapper.get_ivy_marker(dependency.identifier());
            if dependency.is_required() {
                match mapped {
                    Some(mapped) => {
                        dependencies.insert(mapped.clone(), dependency.clone());
                    }
                    None => missing.push(dependency.clone()),
                }
            } else {
                optional_dependencies.insert(dependency.clone(), mapped.cloned());
            }
        }

        if !missing.is_empty() {
            return Err(IvyError::MissingDependencies { marker, missing });
        }

        let (bin, src, doc) = futures::join!(
            probe(fetcher, ArtifactType::Bin, project.jar_url()),
            probe(fetcher, ArtifactType::Src, project.sources_url()),
            probe(fetcher, ArtifactType::Doc, project.javadoc_url()),
        );
        let artifacts = [bin, src, doc].into_iter().flatten().collect();

        Ok(Self {
            marker,
            maven_id: project.identifier().as_string(),
            publication: project.last_modified().unwrap_or_else(Utc::now),
            home_page: project.url().map(str::to_string),
            description: project
                .description()
                .or_else(|| project.name())
                .map(str::to_string),
            licenses: project.licenses().clone(),
            dependencies,
            optional_dependencies,
            artifacts,
        })
    }

    /// Identity of the descriptor; its source is the project coordinate.
    pub const fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn maven_id(&self) -> &str {
        &self.maven_id
    }

    pub const fn publication(&self) -> DateTime<Utc> {
        self.publication
    }

    /// Publication time as `yyyyMMddHHmmss`.
    pub fn publication_string(&self) -> String {
        self.publication.format("%Y%m%d%H%M%S").to_string()
    }

    pub fn home_page(&self) -> Option<&str> {
        self.home_page.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub const fn licenses(&self) -> &BTreeMap<Arc<License>, Option<String>> {
        &self.licenses
    }

    /// Required dependencies keyed by the marker they translate to.
    pub const fn dependencies(&self) -> &BTreeMap<Marker, Dependency> {
        &self.dependencies
    }

    /// Optional and non-runtime dependencies with their marker, if any.
    pub const fn optional_dependencies(&self) -> &BTreeMap<Dependency, Option<Marker>> {
        &self.optional_dependencies
    }

    pub const fn artifacts(&self) -> &BTreeMap<ArtifactType, Url> {
        &self.artifacts
    }
}

async fn probe(fetcher: &dyn Fetcher, kind: ArtifactType, url: &Url) -> Option<(ArtifactType, Url)> {
    match fetcher.probe(url).await {
        Ok(Some(found)) => {
            tracing::info!("Artifact URI {} found", found);
            Some((kind, found))
        }
        Ok(None) => {
            tracing::warn!("Artifact URI {} not accessible", url);
            None
        }
        Err(e) => {
            tracing::error!("I/O error calling HEAD on {}: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use demaven_core::{CoreError, Document, Identifier, LicenseRegistry, parse_xml};
    use std::collections::{HashMap, HashSet};

    const LOCATION: &str = "https://repo.example.com/g/a/1.0.0/a-1.0.0.pom";

    /// Confirms only the listed URLs; javadoc probes fail outright.
    struct Probes(HashSet<String>);

    #[async_trait]
    impl Fetcher for Probes {
        async fn fetch(&self, url: &Url) -> demaven_core::Result<Document> {
            Err(CoreError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }

        async fn probe(&self, url: &Url) -> demaven_core::Result<Option<Url>> {
            if url.path().contains("-javadoc") {
                return Err(CoreError::HttpStatus {
                    url: url.to_string(),
                    status: 500,
                });
            }
            Ok(self.0.contains(url.as_str()).then(|| url.clone()))
        }
    }

    fn probes(urls: &[&str]) -> Probes {
        Probes(urls.iter().map(|u| (*u).to_string()).collect())
    }

    fn project(dependencies: &str) -> Project {
        let xml = format!(
            "<project><name>Library A</name><url>https://a.example.com</url>\
             <dependencies>{dependencies}</dependencies></project>"
        );
        let node = parse_xml(&xml, LOCATION, None).unwrap();
        let id: Identifier = "g#a#1.0.0".parse().unwrap();
        Project::assemble(id, &node, None, &LicenseRegistry::new()).unwrap()
    }

    fn dep(coordinate: &str, extra: &str) -> String {
        let id: Identifier = coordinate.parse().unwrap();
        format!(
            "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>{extra}</dependency>",
            id.group_id(),
            id.artifact_id(),
            id.version().unwrap_or_default()
        )
    }

    fn mapper(overrides: &[(&str, &str)], known: &[(&str, &str)]) -> Mapper {
        let overrides = overrides
            .iter()
            .map(|(a, b)| (a.parse().unwrap(), b.parse().unwrap()))
            .collect();
        let known: HashMap<Identifier, Marker> = known
            .iter()
            .map(|(maven, ivy)| {
                let id: Identifier = maven.parse().unwrap();
                (id.clone(), Marker::parse(Some(id), ivy).unwrap())
            })
            .collect();
        Mapper::new(overrides, known).unwrap()
    }

    #[tokio::test]
    async fn test_wildcard_override_end_to_end() {
        let project = project(&dep("d#e#2.0.0", ""));
        let mapper = mapper(
            &[("d#e", "x#y")],
            &[("x#y#2.0.0", "x#y#2.0.0"), ("x#y#3.0.0", "x#y#3.0.0")],
        );

        let descriptor = Descriptor::build(&project, &mapper, &probes(&[]), None)
            .await
            .unwrap();

        let required: Vec<(String, String)> = descriptor
            .dependencies()
            .iter()
            .map(|(m, d)| (m.as_string(), d.identifier().as_string()))
            .collect();
        assert_eq!(required, vec![("x#y#2.0.0".to_string(), "d#e#2.0.0".to_string())]);
    }

    #[tokio::test]
    async fn test_missing_dependencies_are_batched() {
        let deps = [
            dep("m#one#1.0", ""),
            dep("ok#dep#1.0", "<scope>runtime</scope>"),
            dep("m#two#1.0", ""),
        ]
        .concat();
        let project = project(&deps);
        let mapper = mapper(&[], &[("ok#dep#1.0", "ok#dep#1.0")]);

        let err = Descriptor::build(&project, &mapper, &probes(&[]), None)
            .await
            .unwrap_err();
        match err {
            IvyError::MissingDependencies { marker, missing } => {
                assert_eq!(marker.as_string(), "g#a#1.0.0");
                let missing: Vec<String> =
                    missing.iter().map(|d| d.identifier().as_string()).collect();
                assert_eq!(missing, vec!["m#one#1.0", "m#two#1.0"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_dependency_partition() {
        let deps = [
            dep("c#req#1.0", ""),
            dep("c#opt#1.0", "<optional>true</optional>"),
            dep("c#test#1.0", "<scope>test</scope>"),
            dep("c#prov#1.0", "<scope>provided</scope>"),
        ]
        .concat();
        let project = project(&deps);
        let mapper = mapper(
            &[],
            &[("c#req#1.0", "c#req#1.0"), ("c#test#1.0", "c#test#1.0")],
        );

        let descriptor = Descriptor::build(&project, &mapper, &probes(&[]), None)
            .await
            .unwrap();

        assert_eq!(descriptor.dependencies().len(), 1);
        let optional: Vec<(String, Option<String>)> = descriptor
            .optional_dependencies()
            .iter()
            .map(|(d, m)| (d.identifier().as_string(), m.as_ref().map(Marker::as_string)))
            .collect();
        assert_eq!(
            optional,
            vec![
                ("c#opt#1.0".to_string(), None),
                ("c#prov#1.0".to_string(), None),
                ("c#test#1.0".to_string(), Some("c#test#1.0".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_identity_and_metadata() {
        let project = project("");
        let mapper = Mapper::default();

        let descriptor = Descriptor::build(&project, &mapper, &probes(&[]), None)
            .await
            .unwrap();
        assert_eq!(descriptor.marker().as_string(), "g#a#1.0.0");
        assert_eq!(descriptor.marker().source().unwrap().as_string(), "g#a#1.0.0");
        assert_eq!(descriptor.maven_id(), "g#a#1.0.0");
        assert_eq!(descriptor.home_page(), Some("https://a.example.com"));
        assert_eq!(descriptor.description(), Some("Library A"));
        assert_eq!(descriptor.publication_string().len(), 14);

        let translation: Marker = "org.a#lib-a#1.0".parse().unwrap();
        let descriptor = Descriptor::build(&project, &mapper, &probes(&[]), Some(&translation))
            .await
            .unwrap();
        assert_eq!(descriptor.marker().as_string(), "org.a#lib-a#1.0");
        assert_eq!(descriptor.maven_id(), "g#a#1.0.0");
    }

    #[tokio::test]
    async fn test_artifact_probes() {
        let project = project("");
        let fetcher = probes(&["https://repo.example.com/g/a/1.0.0/a-1.0.0.jar"]);

        let descriptor = Descriptor::build(&project, &Mapper::default(), &fetcher, None)
            .await
            .unwrap();
        let artifacts: Vec<(ArtifactType, &str)> = descriptor
            .artifacts()
            .iter()
            .map(|(t, u)| (*t, u.as_str()))
            .collect();
        assert_eq!(
            artifacts,
            vec![(ArtifactType::Bin, "https://repo.example.com/g/a/1.0.0/a-1.0.0.jar")]
        );
    }
}
