use std::path::{Path, PathBuf};

mod test_binary_main;
pub use test_binary_main::test_binary_main;

fn exe_name(name: &str) -> String {
    format!("{}{}", name, std::env::consts::EXE_SUFFIX)
}

fn copy_or_symlink(src: &Path, dest: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(src, dest)
    }

    #[cfg(not(unix))]
    {
        std::fs::copy(src, dest).map(|_| ())
    }
}

/// A temporary directory holding a link to the test binary. The binary records its arguments
/// there and replays the exit status and output configured with the `with_*` methods.
pub struct Workdir {
    dir: tempfile::TempDir,
}

impl Workdir {
    const TARGET_BINARY_NAME: &'static str = "cordova";

    pub fn new(test_binary: impl AsRef<Path>) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        copy_or_symlink(
            test_binary.as_ref(),
            &dir.path().join(exe_name(Self::TARGET_BINARY_NAME)),
        )
        .unwrap();
        Self { dir }
    }

    pub fn with_exit_status(self, exit_status: i32) -> Self {
        std::fs::write(self.path().join("exit-status"), exit_status.to_string()).unwrap();
        self
    }

    pub fn with_stdout(self, stdout: impl AsRef<[u8]>) -> Self {
        std::fs::write(self.path().join("stdout"), stdout.as_ref()).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn test_binary(&self) -> PathBuf {
        self.dir.path().join(exe_name(Self::TARGET_BINARY_NAME))
    }

    pub fn args(&self) -> Args {
        Args::new(&self.path().join("args")).unwrap()
    }
}

pub struct Args {
    args: Vec<String>,
}

impl Args {
    fn new(args_file: &Path) -> std::io::Result<Args> {
        let args = std::fs::read_to_string(args_file)?
            .lines()
            .map(|s| s.to_owned())
            .collect();
        Ok(Args { args })
    }

    pub fn assert_args(&self, args: &[impl AsRef<str>]) -> &Self {
        let args = args.iter().map(|s| s.as_ref()).collect::<Vec<_>>();
        assert_eq!(&self.args, &args);
        self
    }
}
