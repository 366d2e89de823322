use super::{source::Resolved, Fingerprint, Session};
use crate::catalog::ResourceType;

/// Fingerprints the resolved sources of `res_type`, attaches them to their jobs and decides
/// what each job needs: reuse of a cached image, a skip because the source is too small, or a
/// place in the generation queue. Returns the number of jobs served from the cache.
#[tracing::instrument(level = "debug", skip_all, fields(res_type = %res_type))]
pub async fn fingerprint_sources(
    session: &mut Session,
    res_type: ResourceType,
    resolved: &[Resolved],
) -> usize {
    let mut from_cache = 0;

    for Resolved { platform, path } in resolved {
        let Some(source_idx) = session.sources.iter().position(|s| &s.path == path) else {
            continue;
        };

        let fingerprint = match &session.sources[source_idx].fingerprint {
            Some(fingerprint) => fingerprint.clone(),
            None => match Fingerprint::of_file(path).await {
                Ok(fingerprint) => {
                    session.sources[source_idx].fingerprint = Some(fingerprint.clone());
                    fingerprint
                }
                Err(error) => {
                    tracing::error!(%error, "error reading {}", path.display());
                    skip_platform(session, res_type, platform);
                    continue;
                }
            },
        };

        let job_indices = session
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.res_type == res_type && j.platform == *platform)
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();

        for idx in job_indices {
            let scratch_path = {
                let job = &mut session.jobs[idx];
                let scratch_path = session.cache.scratch_path(&fingerprint, job.width, job.height);
                job.fingerprint = Some(fingerprint.clone());
                job.scratch_path = Some(scratch_path.clone());
                scratch_path
            };

            if session.cache.has_image(&scratch_path).await {
                tracing::info!("{} from cache", session.jobs[idx]);
                from_cache += 1;
                continue;
            }

            // a source already marked for upload had no usable cache entry
            let source = &session.sources[source_idx];
            if source.metadata.is_none() && !source.needs_upload {
                session.sources[source_idx].metadata = session.cache.lookup(&fingerprint).await;
            }
            let metadata = session.sources[source_idx].metadata;
            match metadata {
                Some(metadata) if session.jobs[idx].too_large_for(&metadata) => {
                    session.jobs[idx].skip = true;
                    tracing::error!(
                        "{} skipped, source image {} ({}x{}) too small",
                        session.jobs[idx],
                        session.sources[source_idx].filename,
                        metadata.width,
                        metadata.height
                    );
                }
                Some(_) => session.pending.push(idx),
                None => {
                    session.sources[source_idx].needs_upload = true;
                    session.pending.push(idx);
                }
            }
        }
    }

    from_cache
}

fn skip_platform(session: &mut Session, res_type: ResourceType, platform: &str) {
    for job in session
        .jobs
        .iter_mut()
        .filter(|j| j.res_type == res_type && j.platform == platform)
    {
        job.skip = true;
    }
}
