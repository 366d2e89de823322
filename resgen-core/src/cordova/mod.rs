use std::{
    ffi::OsStr,
    path::PathBuf,
    process::Stdio,
};
use tokio::process::Command;

pub use process::*;

mod process;
mod util;

#[derive(Debug, Default, Copy, Clone)]
pub enum Output {
    #[default]
    Null,
    Inherit,
    Capture,
}

impl From<Output> for Stdio {
    fn from(v: Output) -> Self {
        match v {
            Output::Null => Stdio::null(),
            Output::Inherit => Stdio::inherit(),
            Output::Capture => Stdio::piped(),
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Options {
    pub stdout: Output,
    pub stderr: Output,
}

impl Options {
    pub fn inherit_output() -> Options {
        Options {
            stdout: Output::Inherit,
            stderr: Output::Inherit,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to start cordova process")]
    FailedToStartCordovaProcess(#[source] std::io::Error),
    #[error("error getting subprocess status")]
    SubprocessStatusError(#[source] std::io::Error),
    #[error("{}", .0.message())]
    CordovaError(ExitStatus),
}

/// Flags that only make sense for the dev server and would confuse cordova.
const IGNORED_FLAGS: &[&str] = &[
    "--livereload",
    "-l",
    "--consolelogs",
    "-c",
    "--serverlogs",
    "-s",
    "-i",
];

/// Dev server flags that take a value as the following argument.
const IGNORED_FLAGS_WITH_VALUE: &[&str] = &["--port", "-p", "--livereload-port", "-r", "--address"];

/// Builds the argument list passed to cordova for a command, dropping dev-server options.
pub fn filter_arguments(command: &str, args: &[impl AsRef<str>]) -> Vec<String> {
    let mut filtered = vec![command.to_owned()];
    let mut skip_value = false;
    for arg in args {
        let arg = arg.as_ref();
        if skip_value {
            skip_value = false;
            continue;
        }
        if IGNORED_FLAGS_WITH_VALUE.contains(&arg) {
            skip_value = true;
            continue;
        }
        let is_inline_value = IGNORED_FLAGS_WITH_VALUE
            .iter()
            .any(|flag| flag.starts_with("--") && arg.starts_with(&format!("{}=", flag)));
        if IGNORED_FLAGS.contains(&arg) || is_inline_value {
            continue;
        }
        filtered.push(arg.to_owned());
    }
    filtered
}

#[derive(Debug)]
pub struct Cordova {
    path: PathBuf,
    working_dir: Option<PathBuf>,
}

impl Cordova {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Cordova {
            path: path.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(self, working_dir: impl Into<PathBuf>) -> Self {
        Cordova {
            working_dir: Some(working_dir.into()),
            ..self
        }
    }

    pub fn run(
        &self,
        args: &[impl AsRef<OsStr>],
        options: &Options,
    ) -> Result<CordovaProcess, Error> {
        let mut cmd = Command::new(&self.path);
        cmd.stdin(Stdio::null())
            .stdout(options.stdout)
            .stderr(options.stderr)
            .kill_on_drop(true);
        if let Some(working_dir) = &self.working_dir {
            cmd.current_dir(working_dir);
        }
        for arg in args {
            cmd.arg(arg.as_ref());
        }
        tracing::debug!(cordova = %self.path.display(), "starting cordova");
        let child = cmd.spawn().map_err(Error::FailedToStartCordovaProcess)?;
        Ok(CordovaProcess(child))
    }

    /// Runs a cordova command with dev-server options filtered out of `args`.
    pub fn run_command(
        &self,
        command: &str,
        args: &[impl AsRef<str>],
        options: &Options,
    ) -> Result<CordovaProcess, Error> {
        self.run(&filter_arguments(command, args), options)
    }

    pub fn platform_add(&self, platform: &str, options: &Options) -> Result<CordovaProcess, Error> {
        self.run(&["platform", "add", platform], options)
    }
}
