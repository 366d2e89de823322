use clap::Parser as _;
use resgen_core::{appconfig::AppConfig, cordova::Cordova, project::Project};
use std::path::Path;

pub mod cli;
mod commands;

fn setup_logger(verbose: bool, log_file: Option<&Path>) -> eyre::Result<()> {
    use tracing::Level;
    use tracing_subscriber::{
        filter::LevelFilter,
        fmt::{format::FmtSpan, layer, time::LocalTime},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        Registry,
    };

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = Registry::default()
        .with(LevelFilter::from(level))
        .with(layer().with_ansi(true).with_target(false).without_time());

    if let Some(log_file) = log_file {
        let time_format = time::macros::format_description!(
            "[year]-[month]-[day] [hour repr:24]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        );

        let file = std::fs::File::options()
            .append(true)
            .create(true)
            .open(log_file)?;
        builder
            .with(
                layer()
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_timer(LocalTime::new(time_format))
                    .with_writer(file),
            )
            .try_init()?;
    } else {
        builder.try_init()?;
    }

    Ok(())
}

async fn load_app_config(args: &cli::Cli) -> eyre::Result<AppConfig> {
    let config = match &args.app_config {
        Some(path) => AppConfig::parse_file(path).await?,
        None => AppConfig::load_from_project(&args.project_dir).await?,
    };
    Ok(config)
}

pub async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = cli::Cli::parse();
    setup_logger(args.verbose, args.log_file.as_deref())?;

    let app_config = load_app_config(&args).await?;
    let cordova =
        Cordova::new(&app_config.cordova_binary).with_working_dir(&args.project_dir);

    match args.subcommand {
        cli::Cmd::Resources(resources_args) => {
            let project = Project::new(&args.project_dir, app_config);
            commands::resources::run(project, resources_args).await
        }
        cli::Cmd::Cordova(cordova_args) => commands::cordova(&cordova, cordova_args).await,
        cli::Cmd::PlatformAdd(platform_args) => {
            let project = Project::new(&args.project_dir, app_config);
            commands::platform_add(&project, &cordova, platform_args).await
        }
        cli::Cmd::Config => commands::config(&app_config),
        cli::Cmd::Version => commands::version(&cordova).await,
    }
}
