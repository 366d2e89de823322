use super::{ImageApi, Session};
use futures::future::join_all;

/// Uploads every source the cache had no metadata for, all at once, and records what the
/// service reports. A source that fails to upload takes its jobs out of the queue. Returns the
/// number of successful uploads.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn upload_sources(session: &mut Session, api: &(impl ImageApi + ?Sized)) -> usize {
    let uploads = session
        .sources
        .iter()
        .enumerate()
        .filter(|(_, s)| s.needs_upload)
        .filter_map(|(idx, s)| {
            let fingerprint = s.fingerprint.clone()?;
            let path = s.path.clone();
            let filename = s.filename.clone();
            Some(async move {
                tracing::info!("uploading {}", filename);
                let result = api.upload(&fingerprint, &path, &filename).await;
                (idx, fingerprint, result)
            })
        })
        .collect::<Vec<_>>();
    if uploads.is_empty() {
        return 0;
    }

    let mut uploaded = 0;
    for (idx, fingerprint, result) in join_all(uploads).await {
        let source = &mut session.sources[idx];
        source.needs_upload = false;
        match result {
            Ok(metadata) => {
                if metadata.vector {
                    tracing::info!("{} upload complete (vector image)", source.filename);
                } else {
                    tracing::info!(
                        "{} ({}x{}) upload complete",
                        source.filename,
                        metadata.width,
                        metadata.height
                    );
                }
                source.metadata = Some(metadata);
                session.cache.write(&fingerprint, metadata).await;
                uploaded += 1;
            }
            Err(error) => {
                tracing::error!(
                    "{}: {:#}",
                    source.filename,
                    eyre::Report::new(error)
                );
                session.skip_jobs_for(&fingerprint);
            }
        }
    }
    uploaded
}
