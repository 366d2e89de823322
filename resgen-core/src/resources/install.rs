use super::Session;

/// Copies each generated image from the scratch directory to its place in the project. Jobs
/// that were skipped or whose scratch file is missing are left out. Returns the number of
/// images installed.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn install_images(session: &mut Session) -> usize {
    let root = session.project.root().to_owned();
    let mut installed = 0;

    for job in session.jobs.iter_mut().filter(|j| !j.skip) {
        let Some(scratch_path) = &job.scratch_path else {
            continue;
        };
        let destination = root.join(&job.destination);
        if let Some(parent) = destination.parent() {
            if let Err(error) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(%error, "failed to create {}", parent.display());
                continue;
            }
        }
        match tokio::fs::copy(scratch_path, &destination).await {
            Ok(_) => {
                tracing::debug!(job = %job, "installed {}", job.destination);
                job.produced = true;
                installed += 1;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install {}", job.destination);
            }
        }
    }
    installed
}
