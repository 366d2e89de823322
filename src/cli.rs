use std::path::PathBuf;

/// Generates app icons and splash screens for Cordova projects.
#[derive(clap::Parser)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Logs debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also writes the log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Sets a custom application configuration file instead of the project's resgen.toml
    #[arg(long, env = "RESGEN_APP_CONFIG", global = true)]
    pub app_config: Option<PathBuf>,

    /// Runs as if started in this project directory
    #[arg(short = 'C', long = "project-dir", default_value = ".", global = true)]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub subcommand: Cmd,
}

#[derive(clap::Subcommand)]
pub enum Cmd {
    /// Generates icons and splash screens for all installed platforms
    Resources(resources::Cli),

    /// Runs a cordova command, dropping options only meant for the dev server
    Cordova(cordova::Cli),

    /// Adds a platform to the project unless it's already installed
    PlatformAdd(platform_add::Cli),

    /// Prints the active configuration
    Config,

    /// Prints version information
    Version,
}

pub mod resources {
    #[derive(clap::Args)]
    pub struct Cli {
        /// Only generates icons
        #[arg(short, long)]
        pub icon: bool,

        /// Only generates splash screens
        #[arg(short, long)]
        pub splash: bool,

        /// Maximum number of images generated at the same time
        #[arg(long)]
        pub concurrency: Option<usize>,

        /// Base URL of the image service
        #[arg(long)]
        pub api_url: Option<String>,
    }
}

pub mod cordova {
    #[derive(clap::Args)]
    pub struct Cli {
        /// The cordova command to run
        #[arg(value_name = "COMMAND")]
        pub command: String,

        /// Command-line arguments to pass to cordova
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        pub args: Vec<String>,
    }
}

pub mod platform_add {
    #[derive(clap::Args)]
    pub struct Cli {
        /// The platform to add, for example ios or android
        #[arg(value_name = "PLATFORM")]
        pub platform: String,
    }
}
