use assert_cmd::Command;
use std::path::Path;

fn resgen(project_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("test-resgen").unwrap();
    cmd.arg("-C").arg(project_dir).env_remove("RESGEN_APP_CONFIG");
    cmd
}

fn output_of(output: &[u8]) -> String {
    String::from_utf8_lossy(output).into_owned()
}

#[test]
fn should_fail_outside_of_cordova_project() {
    let tmp = tempfile::tempdir().unwrap();

    let assert = resgen(tmp.path()).arg("resources").assert().failure();

    assert!(output_of(&assert.get_output().stderr).contains("config.xml"));
}

#[test]
fn should_fail_without_installed_platforms() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.xml"), "<widget/>").unwrap();

    let assert = resgen(tmp.path()).arg("resources").assert().failure();

    assert!(output_of(&assert.get_output().stderr).contains("no platforms have been added"));
}

#[test]
fn should_report_missing_source_images_without_failing() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.xml"), "<widget/>").unwrap();
    std::fs::create_dir_all(tmp.path().join("platforms/android")).unwrap();
    std::fs::write(
        tmp.path().join("resgen.toml"),
        format!(
            "scratch-dir = '{}'\n",
            tmp.path().join("scratch").display()
        ),
    )
    .unwrap();

    let assert = resgen(tmp.path()).args(["resources", "--icon"]).assert().success();

    let stdout = output_of(&assert.get_output().stdout);
    assert!(stdout.contains("icon source file not found"));
    assert!(tmp.path().join("resources/android/icon").is_dir());
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("config.xml")).unwrap(),
        "<widget/>"
    );
}

#[test]
fn should_print_effective_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("resgen.toml"), "concurrency = 2\n").unwrap();

    let assert = resgen(tmp.path()).arg("config").assert().success();

    let stdout = output_of(&assert.get_output().stdout);
    assert!(stdout.contains("concurrency = 2"));
    assert!(stdout.contains("api-url = \"http://res.ionic.io\""));
}

#[test]
fn should_reject_invalid_app_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("custom.toml"), "concurrency = \"many\"\n").unwrap();

    resgen(tmp.path())
        .arg("--app-config")
        .arg(tmp.path().join("custom.toml"))
        .arg("config")
        .assert()
        .failure();
}
