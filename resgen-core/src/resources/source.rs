use super::Session;
use crate::catalog::{self, ResourceType};
use std::path::PathBuf;

/// The source image chosen for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub platform: &'static str,
    pub path: PathBuf,
}

/// Finds the source image for every platform that has jobs of `res_type`.
///
/// For each accepted extension in order, `resources/<platform>/<type>.<ext>` is tried before
/// `resources/<type>.<ext>`. Platforms without a source are reported together and left out.
#[tracing::instrument(level = "debug", skip_all, fields(res_type = %res_type))]
pub async fn resolve_sources(session: &mut Session, res_type: ResourceType) -> Vec<Resolved> {
    let mut platforms: Vec<&'static str> = Vec::new();
    for job in session.jobs.iter().filter(|j| j.res_type == res_type) {
        if !platforms.contains(&job.platform) {
            platforms.push(job.platform);
        }
    }

    let resource_dir = session.project.resource_dir();
    let candidates = catalog::source_file_names(res_type);
    let mut resolved = Vec::new();
    let mut missing = Vec::new();

    for platform in platforms {
        let mut found = None;
        for candidate in &candidates {
            let platform_file = resource_dir.join(platform).join(candidate);
            let shared_file = resource_dir.join(candidate);
            if exists(&platform_file).await {
                found = Some((platform_file, format!("{}/{}", platform, candidate)));
                break;
            } else if exists(&shared_file).await {
                found = Some((shared_file, candidate.clone()));
                break;
            }
        }

        match found {
            Some((path, filename)) => {
                tracing::debug!(platform, source = %filename, "found source image");
                session.add_source(path.clone(), filename);
                resolved.push(Resolved { platform, path });
            }
            None => missing.push(platform),
        }
    }

    if !missing.is_empty() {
        let resource_dir = session.project.config().resource_dir.display().to_string();
        let mut dirs = vec![resource_dir.clone()];
        dirs.extend(missing.iter().map(|p| format!("{}/{}", resource_dir, p)));
        tracing::error!(
            "{} source file not found in any of these directories: {}",
            res_type,
            dirs.join(", ")
        );
        tracing::error!(
            "valid {} source files: {}",
            res_type,
            candidates.join(", ")
        );
    }

    resolved
}

async fn exists(path: &std::path::Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
