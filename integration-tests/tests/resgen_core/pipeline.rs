use async_trait::async_trait;
use resgen_core::{
    appconfig::AppConfig,
    catalog::ResourceType,
    project::Project,
    resources::{
        self,
        api::{self, Operation, TransformRequest},
        ConfigOutcome, Fingerprint, ImageApi, SourceMetadata,
    },
};
use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

const CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<widget xmlns="http://www.w3.org/ns/widgets" id="com.example.app" version="0.0.1">
    <name>Example</name>
</widget>
"#;

struct FakeImageService {
    source_size: u32,
    fail: bool,
    uploads: AtomicUsize,
    transforms: AtomicUsize,
}

impl FakeImageService {
    fn new(source_size: u32) -> Self {
        FakeImageService {
            source_size,
            fail: false,
            uploads: AtomicUsize::new(0),
            transforms: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageApi for FakeImageService {
    async fn upload(
        &self,
        _fingerprint: &Fingerprint,
        _path: &Path,
        _filename: &str,
    ) -> Result<SourceMetadata, api::Error> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(SourceMetadata {
            width: self.source_size,
            height: self.source_size,
            vector: false,
        })
    }

    async fn transform(&self, request: &TransformRequest, destination: &Path) -> Result<(), api::Error> {
        self.transforms.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(api::Error::ServiceUnavailable {
                operation: Operation::Transform,
                message: "not found".to_owned(),
            });
        }
        tokio::fs::write(
            destination,
            format!("{}x{}", request.width, request.height),
        )
        .await
        .map_err(|e| api::Error::Io(destination.to_owned(), e))
    }
}

fn android_project(dir: &Path) -> Project {
    std::fs::write(dir.join("config.xml"), CONFIG).unwrap();
    std::fs::create_dir_all(dir.join("platforms/android")).unwrap();
    std::fs::create_dir_all(dir.join("resources")).unwrap();
    std::fs::write(dir.join("resources/icon.png"), b"icon source").unwrap();
    let config = AppConfig {
        scratch_dir: Some(dir.join("scratch")),
        ..AppConfig::default()
    };
    Project::new(dir, config)
}

#[tokio::test]
async fn should_generate_install_and_register_icons() {
    let tmp = tempfile::tempdir().unwrap();
    let project = android_project(tmp.path());
    let api = FakeImageService::new(1024);

    let summary = resources::run(&project, &api, &[ResourceType::Icon])
        .await
        .unwrap();

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.generated, 6);
    assert_eq!(summary.installed, 6);
    assert_eq!(summary.config, ConfigOutcome::Updated);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("resources/android/icon/drawable-hdpi-icon.png"))
            .unwrap(),
        "72x72"
    );
    let config = std::fs::read_to_string(tmp.path().join("config.xml")).unwrap();
    assert!(config.contains(r#"src="resources/android/icon/drawable-xxxhdpi-icon.png""#));
    assert!(config.contains(r#"density="xxxhdpi""#));
}

#[tokio::test]
async fn should_not_contact_service_when_everything_is_cached() {
    let tmp = tempfile::tempdir().unwrap();
    let project = android_project(tmp.path());
    resources::run(&project, &FakeImageService::new(1024), &[ResourceType::Icon])
        .await
        .unwrap();
    let config_after_first_run = std::fs::read(tmp.path().join("config.xml")).unwrap();
    let api = FakeImageService::new(1024);

    let summary = resources::run(&project, &api, &[ResourceType::Icon])
        .await
        .unwrap();

    assert_eq!(api.uploads.load(Ordering::SeqCst), 0);
    assert_eq!(api.transforms.load(Ordering::SeqCst), 0);
    assert_eq!(summary.from_cache, 6);
    assert_eq!(summary.installed, 6);
    assert_eq!(summary.config, ConfigOutcome::Unchanged);
    assert_eq!(
        std::fs::read(tmp.path().join("config.xml")).unwrap(),
        config_after_first_run
    );
}

#[tokio::test]
async fn should_skip_images_larger_than_source() {
    let tmp = tempfile::tempdir().unwrap();
    let project = android_project(tmp.path());
    let api = FakeImageService::new(100);

    let summary = resources::run(&project, &api, &[ResourceType::Icon])
        .await
        .unwrap();

    assert_eq!(summary.generated, 4);
    assert_eq!(summary.skipped, 2);
    assert!(!tmp
        .path()
        .join("resources/android/icon/drawable-xxhdpi-icon.png")
        .exists());
    let config = std::fs::read_to_string(tmp.path().join("config.xml")).unwrap();
    assert!(!config.contains("drawable-xxhdpi-icon.png"));
}

#[tokio::test]
async fn should_abort_before_install_when_generation_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let project = android_project(tmp.path());
    let api = FakeImageService {
        fail: true,
        ..FakeImageService::new(1024)
    };

    let result = resources::run(&project, &api, &[ResourceType::Icon]).await;

    assert!(result.is_err());
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("config.xml")).unwrap(),
        CONFIG
    );
    assert!(!tmp
        .path()
        .join("resources/android/icon/drawable-mdpi-icon.png")
        .exists());
}
