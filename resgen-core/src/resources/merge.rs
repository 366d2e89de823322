use super::{ImageJob, Session};
use crate::{
    catalog::{NodeAttribute, ResourceType},
    configxml::{self, ConfigDocument},
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// no images were produced, the config file wasn't read
    #[default]
    NothingToDo,
    Unchanged,
    Updated,
    Failed,
}

/// Replaces the resource entries of every touched platform and resource type with the images
/// this run produced and points the default icon at the best fitting one. The file is only
/// written if that changed anything.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn update_config(session: &Session) -> Result<ConfigOutcome, configxml::Error> {
    let jobs = session
        .jobs
        .iter()
        .filter(|j| j.produced && !j.skip)
        .collect::<Vec<_>>();
    if jobs.is_empty() {
        return Ok(ConfigOutcome::NothingToDo);
    }

    let path = session.project.config_file();
    let original = ConfigDocument::read(&path).await?;
    let mut doc = original.clone();
    merge_jobs(
        &mut doc,
        jobs.iter().copied(),
        session.project.config().default_max_icon_size,
    );

    if doc.is_equivalent(&original) {
        tracing::debug!("{} is up to date", path.display());
        return Ok(ConfigOutcome::Unchanged);
    }
    doc.write(&path).await?;
    tracing::info!("updated {}", path.display());
    Ok(ConfigOutcome::Updated)
}

/// Applies `jobs` to `doc` in memory.
pub fn merge_jobs<'a>(
    doc: &mut ConfigDocument,
    jobs: impl IntoIterator<Item = &'a ImageJob> + Clone,
    max_default_icon_size: u32,
) {
    let touched = jobs
        .clone()
        .into_iter()
        .map(|j| (j.platform, j.node_name))
        .collect::<BTreeSet<_>>();
    // cleared buckets are refilled in place so that untouched buckets keep their order
    let mut positions = BTreeMap::new();
    for (platform, node_name) in touched {
        if let Some(position) = doc.clear_resource_nodes(platform, node_name) {
            positions.insert((platform, node_name), position);
        }
    }

    for job in jobs.clone() {
        let node = match positions.get_mut(&(job.platform, job.node_name)) {
            Some(position) => {
                doc.ensure_resource_node_at(job.platform, job.node_name, &job.destination, position)
            }
            None => doc.ensure_resource_node(job.platform, job.node_name, &job.destination),
        };
        for &attribute in job.node_attributes {
            if attribute == NodeAttribute::Src {
                continue;
            }
            node.attributes
                .insert(attribute.name().to_owned(), job.attribute_value(attribute));
        }
    }

    if let Some(icon) = select_default_icon(jobs, max_default_icon_size) {
        doc.set_default_icon(&icon.destination);
    }
}

/// The widest icon no wider than `max_size`. Among equally wide icons the first one wins.
pub fn select_default_icon<'a>(
    jobs: impl IntoIterator<Item = &'a ImageJob>,
    max_size: u32,
) -> Option<&'a ImageJob> {
    let mut selected: Option<&ImageJob> = None;
    for job in jobs
        .into_iter()
        .filter(|j| j.res_type == ResourceType::Icon && j.width <= max_size)
    {
        if selected.map_or(true, |s| job.width > s.width) {
            selected = Some(job);
        }
    }
    selected
}
