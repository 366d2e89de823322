//! Bounded, de-duplicated generation of images.

use super::{
    api::{self, TransformRequest},
    ImageApi, Session,
};
use futures::stream::{FuturesUnordered, StreamExt as _};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// transform requests sent
    pub requested: usize,
    /// jobs served by a request another job already made
    pub deduplicated: usize,
    /// jobs dropped before any request
    pub skipped: usize,
}

/// Works through `session.pending` with at most `concurrency` transform requests in flight.
///
/// Jobs sharing a scratch file are only requested once. The first failed request stops new
/// requests from being started; those already running finish and the error is returned.
#[tracing::instrument(level = "debug", skip_all, fields(concurrency = concurrency))]
pub async fn generate_images(
    session: &mut Session,
    api: &(impl ImageApi + ?Sized),
    concurrency: usize,
) -> Result<QueueStats, api::Error> {
    let concurrency = concurrency.max(1);
    let mut stats = QueueStats::default();
    let mut in_flight = FuturesUnordered::new();
    let mut first_error = None;

    loop {
        while first_error.is_none() && in_flight.len() < concurrency {
            let Some(idx) = session.pending.pop() else {
                break;
            };
            let Some(request) = prepare(session, idx, &mut stats) else {
                continue;
            };
            let (request, scratch_path) = request;
            tracing::debug!(job = %session.jobs[idx], "requesting image");
            stats.requested += 1;
            in_flight.push(async move {
                let result = api.transform(&request, &scratch_path).await;
                (idx, scratch_path, result)
            });
        }

        let Some((idx, scratch_path, result)) = in_flight.next().await else {
            break;
        };
        match result {
            Ok(()) => tracing::info!("{} generated", session.jobs[idx]),
            Err(error) => {
                tracing::error!("{}: {}", session.jobs[idx], error);
                if let Err(error) = tokio::fs::remove_file(&scratch_path).await {
                    if error.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(%error, "failed to remove {}", scratch_path.display());
                    }
                }
                session.generating.remove(&scratch_path);
                session.jobs[idx].skip = true;
                first_error.get_or_insert(error);
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(stats),
    }
}

/// Decides whether a pending job needs a request of its own.
fn prepare(
    session: &mut Session,
    idx: usize,
    stats: &mut QueueStats,
) -> Option<(TransformRequest, PathBuf)> {
    let job = &session.jobs[idx];
    if job.skip {
        return None;
    }
    let (Some(fingerprint), Some(scratch_path)) = (job.fingerprint.clone(), job.scratch_path.clone()) else {
        session.jobs[idx].skip = true;
        stats.skipped += 1;
        return None;
    };

    let metadata = session
        .source_by_fingerprint(&fingerprint)
        .and_then(|s| s.metadata);
    if let Some(metadata) = metadata {
        if job.too_large_for(&metadata) {
            tracing::error!(
                "{} skipped, source image ({}x{}) too small",
                job,
                metadata.width,
                metadata.height
            );
            session.jobs[idx].skip = true;
            stats.skipped += 1;
            return None;
        }
    }

    if !session.generating.insert(scratch_path.clone()) {
        tracing::debug!(job = %job, "image already requested");
        stats.deduplicated += 1;
        return None;
    }

    let request = TransformRequest {
        fingerprint,
        name: job.name,
        platform: job.platform,
        width: job.width,
        height: job.height,
        res_type: job.res_type,
    };
    Some((request, scratch_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        appconfig::AppConfig,
        catalog::ResourceType,
        project::Project,
        resources::{api::Operation, expand_catalog, Fingerprint, SourceFile, SourceMetadata},
    };
    use async_trait::async_trait;
    use std::{
        path::Path,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    #[derive(Default)]
    struct FakeTransforms {
        running: AtomicUsize,
        max_running: AtomicUsize,
        requests: Mutex<Vec<TransformRequest>>,
        fail_width: Option<u32>,
    }

    #[async_trait]
    impl ImageApi for FakeTransforms {
        async fn upload(&self, _: &Fingerprint, _: &Path, _: &str) -> Result<SourceMetadata, api::Error> {
            unreachable!()
        }

        async fn transform(&self, request: &TransformRequest, destination: &Path) -> Result<(), api::Error> {
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(running, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            std::fs::write(destination, b"partial").unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            if Some(request.width) == self.fail_width {
                return Err(api::Error::TemporarilyUnavailable {
                    operation: Operation::Transform,
                    status: 503,
                    message: "overloaded".to_owned(),
                });
            }
            Ok(())
        }
    }

    async fn session(dir: &Path, platforms: &[&str], res_type: ResourceType) -> Session {
        let config = AppConfig {
            scratch_dir: Some(dir.join("scratch")),
            ..AppConfig::default()
        };
        std::fs::create_dir_all(dir.join("scratch")).unwrap();
        let mut session = Session::new(Project::new(dir, config));
        let platforms = platforms.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        expand_catalog(&mut session, &platforms, res_type)
            .await
            .unwrap();
        let fingerprint = Fingerprint("cafe".to_owned());
        let mut source = SourceFile::new(dir.join("resources/icon.png"), "icon.png".to_owned());
        source.fingerprint = Some(fingerprint.clone());
        source.metadata = Some(SourceMetadata {
            width: 4096,
            height: 4096,
            vector: false,
        });
        session.sources.push(source);
        for (idx, job) in session.jobs.iter_mut().enumerate() {
            job.scratch_path = Some(session.cache.scratch_path(&fingerprint, job.width, job.height));
            job.fingerprint = Some(fingerprint.clone());
            session.pending.push(idx);
        }
        session
    }

    #[tokio::test]
    async fn should_limit_requests_in_flight() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = session(tmp.path(), &["ios"], ResourceType::Splash).await;
        let api = FakeTransforms::default();

        let stats = generate_images(&mut session, &api, 3).await.unwrap();

        assert_eq!(stats.requested, 10);
        assert_eq!(api.max_running.load(Ordering::SeqCst), 3);
        assert!(session.pending.is_empty());
    }

    #[tokio::test]
    async fn should_request_shared_scratch_file_once() {
        let tmp = tempfile::tempdir().unwrap();
        // android port-mdpi and ios Default~iphone are both 320x480
        let mut session = session(tmp.path(), &["android", "ios"], ResourceType::Splash).await;
        let api = FakeTransforms::default();

        let stats = generate_images(&mut session, &api, 5).await.unwrap();

        assert_eq!(stats.requested, 21);
        assert_eq!(stats.deduplicated, 1);
        let requests = api.requests.lock().unwrap();
        assert_eq!(
            requests
                .iter()
                .filter(|r| r.width == 320 && r.height == 480)
                .count(),
            1
        );
        assert!(session.jobs.iter().all(|j| !j.skip));
    }

    #[tokio::test]
    async fn should_skip_too_large_images_without_request() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = session(tmp.path(), &["android"], ResourceType::Icon).await;
        session.sources[0].metadata = Some(SourceMetadata {
            width: 100,
            height: 100,
            vector: false,
        });
        let api = FakeTransforms::default();

        let stats = generate_images(&mut session, &api, 5).await.unwrap();

        assert_eq!(stats.requested, 4);
        assert_eq!(stats.skipped, 2);
        assert!(api.requests.lock().unwrap().iter().all(|r| r.width <= 100));
    }

    #[tokio::test]
    async fn should_stop_after_first_failure_and_clean_up() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = session(tmp.path(), &["ios"], ResourceType::Splash).await;
        // catalog order is kept, pending is worked from the back
        let failing = session.jobs.last().unwrap().clone();
        let api = FakeTransforms {
            fail_width: Some(failing.width),
            ..FakeTransforms::default()
        };

        let error = generate_images(&mut session, &api, 1).await.unwrap_err();

        assert_eq!(error.kind(), api::ErrorKind::TemporarilyUnavailable);
        assert_eq!(api.requests.lock().unwrap().len(), 1);
        assert!(!failing.scratch_path.as_ref().unwrap().exists());
        assert!(session.jobs.last().unwrap().skip);
    }

    #[tokio::test]
    async fn should_treat_zero_concurrency_as_one() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = session(tmp.path(), &["android"], ResourceType::Splash).await;
        let api = FakeTransforms::default();

        let stats = generate_images(&mut session, &api, 0).await.unwrap();

        assert_eq!(stats.requested, 12);
        assert_eq!(api.max_running.load(Ordering::SeqCst), 1);
    }
}
