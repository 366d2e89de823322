use crate::cli;
use resgen_core::{
    appconfig::AppConfig,
    cordova::{Cordova, Options},
    project::Project,
};

pub mod resources;

pub async fn cordova(cordova: &Cordova, args: cli::cordova::Cli) -> eyre::Result<()> {
    cordova
        .run_command(&args.command, &args.args, &Options::inherit_output())?
        .check_wait()
        .await?;
    Ok(())
}

pub async fn platform_add(
    project: &Project,
    cordova: &Cordova,
    args: cli::platform_add::Cli,
) -> eyre::Result<()> {
    if project.is_platform_installed(&args.platform).await {
        tracing::info!("platform {} is already installed", args.platform);
        return Ok(());
    }
    tracing::info!("adding platform {}", args.platform);
    cordova
        .platform_add(&args.platform, &Options::inherit_output())?
        .check_wait()
        .await?;
    Ok(())
}

pub fn config(config: &AppConfig) -> eyre::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub async fn version(cordova: &Cordova) -> eyre::Result<()> {
    println!("resgen: {}", resgen_core::VERSION);

    match cordova.version_string().await {
        Ok(cordova_version) => println!("cordova: {}", cordova_version),
        Err(err) => println!(
            "Could not determine cordova version ({}), is cordova installed correctly?",
            err
        ),
    }
    Ok(())
}
