use crate::appconfig::AppConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {} file, make sure the working directory is a Cordova project", .0.display())]
    MissingConfigFile(PathBuf),
    #[error("no platforms have been added, please add a platform first, for example: resgen platform-add ios")]
    NoPlatforms,
    #[error("i/o error accessing {}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),
}

/// A project directory and the settings that describe its layout.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: AppConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: AppConfig) -> Self {
        Project {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(&self.config.config_file)
    }

    pub fn resource_dir(&self) -> PathBuf {
        self.root.join(&self.config.resource_dir)
    }

    pub fn platforms_dir(&self) -> PathBuf {
        self.root.join(&self.config.platforms_dir)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("plugins")
    }

    pub async fn is_platform_installed(&self, platform: &str) -> bool {
        tokio::fs::metadata(self.platforms_dir().join(platform))
            .await
            .is_ok()
    }

    pub async fn are_plugins_installed(&self) -> bool {
        tokio::fs::metadata(self.plugins_dir()).await.is_ok()
    }

    /// Names of the subdirectories of the platforms directory, sorted. Empty if it doesn't exist.
    pub async fn installed_platforms(&self) -> Result<Vec<String>, Error> {
        let dir = self.platforms_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::IoError(dir, e)),
        };
        let mut platforms = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::IoError(dir.clone(), e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| Error::IoError(entry.path(), e))?
                .is_dir();
            if is_dir {
                platforms.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        platforms.sort();
        Ok(platforms)
    }

    /// Checks the project looks like a Cordova project with at least one platform and
    /// returns the installed platforms.
    pub async fn check_preconditions(&self) -> Result<Vec<String>, Error> {
        let config_file = self.config_file();
        if !tokio::fs::try_exists(&config_file).await.unwrap_or(false) {
            return Err(Error::MissingConfigFile(config_file));
        }
        let platforms = self.installed_platforms().await?;
        if platforms.is_empty() {
            return Err(Error::NoPlatforms);
        }
        Ok(platforms)
    }

    pub async fn ensure_resource_dir(&self) -> Result<PathBuf, Error> {
        let dir = self.resource_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::IoError(dir.clone(), e))?;
        Ok(dir)
    }
}
