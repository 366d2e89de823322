//! The resource generation pipeline.
//!
//! Stages run one after the other, each finishing completely before the next starts:
//! catalog expansion, source resolution, fingerprinting, upload, generation, install and
//! config merge. Per-image failures are logged and the image is dropped from the working set;
//! only a failed generation request or a failed precondition stops the whole run.

use crate::{
    catalog::{self, NodeAttribute, ResourceType},
    project::{self, Project},
};
use std::{collections::HashSet, fmt, path::PathBuf};

pub mod api;
pub mod cache;
pub mod fingerprint;
pub mod install;
pub mod merge;
pub mod queue;
pub mod source;
pub mod upload;

pub use api::{HttpImageApi, ImageApi};
pub use cache::{CacheStore, Fingerprint, SourceMetadata};
pub use merge::ConfigOutcome;

/// A source image found in the resources directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// path relative to the resources directory, for messages
    pub filename: String,
    pub fingerprint: Option<Fingerprint>,
    pub metadata: Option<SourceMetadata>,
    pub needs_upload: bool,
}

impl SourceFile {
    pub fn new(path: PathBuf, filename: String) -> Self {
        SourceFile {
            path,
            filename,
            fingerprint: None,
            metadata: None,
            needs_upload: false,
        }
    }
}

/// One output image for a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub platform: &'static str,
    pub res_type: ResourceType,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub density: Option<&'static str>,
    /// project-relative, `/`-separated; also the `src` of the config node
    pub destination: String,
    pub fingerprint: Option<Fingerprint>,
    pub scratch_path: Option<PathBuf>,
    pub node_name: &'static str,
    pub node_attributes: &'static [NodeAttribute],
    pub skip: bool,
    pub produced: bool,
}

impl ImageJob {
    pub fn attribute_value(&self, attribute: NodeAttribute) -> String {
        match attribute {
            NodeAttribute::Src => self.destination.clone(),
            NodeAttribute::Density => self.density.unwrap_or_default().to_owned(),
            NodeAttribute::Width => self.width.to_string(),
            NodeAttribute::Height => self.height.to_string(),
        }
    }

    /// Whether `source` can't be scaled to this image's size. Vector sources always fit.
    pub fn too_large_for(&self, source: &SourceMetadata) -> bool {
        !source.vector && (source.width < self.width || source.height < self.height)
    }
}

impl fmt::Display for ImageJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}x{})",
            self.res_type, self.platform, self.name, self.width, self.height
        )
    }
}

/// State of one pipeline run.
#[derive(Debug)]
pub struct Session {
    pub project: Project,
    pub cache: CacheStore,
    pub jobs: Vec<ImageJob>,
    pub sources: Vec<SourceFile>,
    /// indices into `jobs` waiting for a transform request
    pub pending: Vec<usize>,
    /// scratch files requested or finished during this run
    pub generating: HashSet<PathBuf>,
}

impl Session {
    pub fn new(project: Project) -> Self {
        let config = project.config();
        let cache = CacheStore::new(config.scratch_dir(), config.cache_images);
        Session {
            project,
            cache,
            jobs: Vec::new(),
            sources: Vec::new(),
            pending: Vec::new(),
            generating: HashSet::new(),
        }
    }

    pub fn source_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<&SourceFile> {
        self.sources
            .iter()
            .find(|s| s.fingerprint.as_ref() == Some(fingerprint))
    }

    /// Adds a source unless one with the same path is already known; returns its index.
    pub fn add_source(&mut self, path: PathBuf, filename: String) -> usize {
        match self.sources.iter().position(|s| s.path == path) {
            Some(idx) => idx,
            None => {
                self.sources.push(SourceFile::new(path, filename));
                self.sources.len() - 1
            }
        }
    }

    /// Marks every job depending on `fingerprint` as skipped and drops it from the queue.
    pub fn skip_jobs_for(&mut self, fingerprint: &Fingerprint) {
        for job in self
            .jobs
            .iter_mut()
            .filter(|j| j.fingerprint.as_ref() == Some(fingerprint))
        {
            job.skip = true;
        }
        let jobs = &self.jobs;
        self.pending.retain(|&idx| !jobs[idx].skip);
    }
}

fn project_relative(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches(|c| c == '/' || c == '\\'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Creates an image job for every catalog image of `res_type` on each known installed platform,
/// creating the destination directories on the way.
#[tracing::instrument(level = "debug", skip_all, fields(res_type = %res_type))]
pub async fn expand_catalog(
    session: &mut Session,
    platforms: &[String],
    res_type: ResourceType,
) -> Result<usize, project::Error> {
    let resource_dir = session.project.config().resource_dir.to_string_lossy().into_owned();
    let mut added = 0;
    for platform in platforms {
        let Some(spec) = catalog::platform(platform) else {
            tracing::debug!(platform = %platform, "no resources for platform");
            continue;
        };
        let res_dir = session
            .project
            .resource_dir()
            .join(spec.name)
            .join(res_type.dir_name());
        tokio::fs::create_dir_all(&res_dir)
            .await
            .map_err(|e| project::Error::IoError(res_dir.clone(), e))?;

        let resource = spec.resource(res_type);
        for image in resource.images {
            session.jobs.push(ImageJob {
                platform: spec.name,
                res_type,
                name: image.name,
                width: image.width,
                height: image.height,
                density: image.density,
                destination: project_relative(&[
                    resource_dir.as_str(),
                    spec.name,
                    res_type.dir_name(),
                    image.name,
                ]),
                fingerprint: None,
                scratch_path: None,
                node_name: resource.node_name,
                node_attributes: resource.node_attributes,
                skip: false,
                produced: false,
            });
            added += 1;
        }
    }
    Ok(added)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub uploaded: usize,
    pub generated: usize,
    pub from_cache: usize,
    pub skipped: usize,
    pub installed: usize,
    pub config: ConfigOutcome,
}

/// Runs the whole pipeline for the given resource types.
pub async fn run(
    project: &Project,
    api: &(impl ImageApi + ?Sized),
    res_types: &[ResourceType],
) -> eyre::Result<Summary> {
    let platforms = project.check_preconditions().await?;
    project.ensure_resource_dir().await?;

    let mut session = Session::new(project.clone());
    session.cache.ensure_dir().await;
    let mut summary = Summary::default();

    for &res_type in res_types {
        expand_catalog(&mut session, &platforms, res_type).await?;
        let resolved = source::resolve_sources(&mut session, res_type).await;
        summary.from_cache += fingerprint::fingerprint_sources(&mut session, res_type, &resolved).await;
    }

    summary.uploaded = upload::upload_sources(&mut session, api).await;

    let stats = queue::generate_images(&mut session, api, project.config().concurrency).await?;
    summary.generated = stats.requested;

    summary.installed = install::install_images(&mut session).await;
    summary.skipped = session.jobs.iter().filter(|j| j.skip).count();

    summary.config = match merge::update_config(&session).await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!("failed to update {}: {:#}", project.config_file().display(), eyre::Report::new(error));
            ConfigOutcome::Failed
        }
    };
    Ok(summary)
}
