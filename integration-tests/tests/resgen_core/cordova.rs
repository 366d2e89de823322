use integration_tests::Workdir;
use resgen_core::cordova::{Cordova, ExitStatus, Options};

fn new_workdir() -> Workdir {
    Workdir::new(env!("CARGO_BIN_EXE_test-binary"))
}

#[tokio::test]
async fn should_run_specified_cordova_binary_with_explicit_arguments() {
    let workdir = new_workdir();
    let cordova = Cordova::new(workdir.test_binary());

    cordova
        .run(&["arg1", "arg2", "arg3"], &Options::default())
        .unwrap()
        .check_wait()
        .await
        .unwrap();

    workdir.args().assert_args(&["arg1", "arg2", "arg3"]);
}

#[tokio::test]
async fn should_drop_dev_server_options_from_command() {
    let workdir = new_workdir();
    let cordova = Cordova::new(workdir.test_binary());

    cordova
        .run_command(
            "run",
            &["android", "--livereload", "--port", "8100", "--address=0.0.0.0", "--device"],
            &Options::default(),
        )
        .unwrap()
        .check_wait()
        .await
        .unwrap();

    workdir.args().assert_args(&["run", "android", "--device"]);
}

#[tokio::test]
async fn should_add_platform() {
    let workdir = new_workdir();
    let cordova = Cordova::new(workdir.test_binary()).with_working_dir(workdir.path());

    cordova
        .platform_add("ios", &Options::default())
        .unwrap()
        .check_wait()
        .await
        .unwrap();

    workdir.args().assert_args(&["platform", "add", "ios"]);
}

#[tokio::test]
async fn should_report_unsuccessful_exit_status() {
    let workdir = new_workdir().with_exit_status(3);
    let cordova = Cordova::new(workdir.test_binary());

    let status = cordova
        .run(&["build"], &Options::default())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(status, ExitStatus::Failed(Some(3)));
    assert_eq!(status.message(), "cordova exited with error status 3");
}

#[tokio::test]
async fn check_wait_should_return_error_if_process_exits_with_unsuccessful_status_code() {
    let workdir = new_workdir().with_exit_status(1);
    let cordova = Cordova::new(workdir.test_binary());

    let result = cordova
        .run(&["build"], &Options::default())
        .unwrap()
        .check_wait()
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn should_read_version_from_first_line_of_output() {
    let workdir = new_workdir().with_stdout("\n12.0.0\n");
    let cordova = Cordova::new(workdir.test_binary());

    let version = cordova.version_string().await.unwrap();

    assert_eq!(version, "12.0.0");
    workdir.args().assert_args(&["--version"]);
}

#[tokio::test]
async fn should_fail_to_start_missing_binary() {
    let workdir = new_workdir();
    let cordova = Cordova::new(workdir.path().join("does-not-exist"));

    let result = cordova.run(&["build"], &Options::default());

    assert!(result.is_err());
}
