use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    pub api_url: String,
    pub upload_path: String,
    pub transform_path: String,
    pub resource_dir: PathBuf,
    pub config_file: PathBuf,
    pub platforms_dir: PathBuf,
    pub concurrency: usize,
    pub default_max_icon_size: u32,
    pub cache_images: bool,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// where transformed images and source metadata are cached; the OS temp dir if not set
    pub scratch_dir: Option<PathBuf>,
    pub cordova_binary: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: "http://res.ionic.io".to_owned(),
            upload_path: "/api/v1/upload".to_owned(),
            transform_path: "/api/v1/transform".to_owned(),
            resource_dir: PathBuf::from("resources"),
            config_file: PathBuf::from("config.xml"),
            platforms_dir: PathBuf::from("platforms"),
            concurrency: 5,
            default_max_icon_size: 96,
            cache_images: true,
            request_timeout: Duration::from_secs(120),
            scratch_dir: None,
            cordova_binary: "cordova".to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("invalid configuration file {}", .0.display())]
    InvalidConfigFile(PathBuf, #[source] eyre::Report),
    #[error("i/o error reading configuration file {}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),
}

impl AppConfig {
    pub const DEFAULT_FILE_NAME: &'static str = "resgen.toml";

    pub async fn parse_file(p: &Path) -> Result<AppConfig, ConfigLoadError> {
        let config_string = tokio::fs::read_to_string(p)
            .await
            .map_err(|e| ConfigLoadError::IoError(p.to_owned(), e))?;
        toml::from_str(&config_string)
            .map_err(|e| ConfigLoadError::InvalidConfigFile(p.to_owned(), e.into()))
    }

    /// Loads `resgen.toml` from the project directory, or the defaults if there is none.
    pub async fn load_from_project(project_dir: &Path) -> Result<AppConfig, ConfigLoadError> {
        let path = project_dir.join(Self::DEFAULT_FILE_NAME);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Self::parse_file(&path).await
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.api_url, self.upload_path)
    }

    pub fn transform_url(&self) -> String {
        format!("{}{}", self.api_url, self.transform_path)
    }
}
