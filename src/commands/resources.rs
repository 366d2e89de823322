use crate::cli;
use resgen_core::{
    catalog::ResourceType,
    project::Project,
    resources::{self, ConfigOutcome, HttpImageApi, Summary},
};

fn resource_types(args: &cli::resources::Cli) -> Vec<ResourceType> {
    match (args.icon, args.splash) {
        (true, false) => vec![ResourceType::Icon],
        (false, true) => vec![ResourceType::Splash],
        _ => ResourceType::ALL.to_vec(),
    }
}

fn print_summary(summary: &Summary) {
    tracing::info!(
        "{} uploaded, {} generated, {} from cache, {} skipped, {} installed",
        summary.uploaded,
        summary.generated,
        summary.from_cache,
        summary.skipped,
        summary.installed
    );
}

pub async fn run(project: Project, args: cli::resources::Cli) -> eyre::Result<()> {
    let res_types = resource_types(&args);
    let mut config = project.config().clone();
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    let project = Project::new(project.root(), config);

    let api = HttpImageApi::new(project.config())?;
    let summary = resources::run(&project, &api, &res_types).await?;
    print_summary(&summary);

    match summary.config {
        ConfigOutcome::Failed => eyre::bail!(
            "images were generated but {} could not be updated",
            project.config_file().display()
        ),
        ConfigOutcome::NothingToDo => {
            tracing::warn!("no images were generated");
        }
        _ => {}
    }
    Ok(())
}
