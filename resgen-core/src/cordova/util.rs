use super::{Cordova, Options, Output};
use tokio::io::{AsyncBufReadExt, BufReader};

impl Cordova {
    pub async fn version_string(&self) -> eyre::Result<String> {
        let mut process = self.run(
            &["--version"],
            &Options {
                stdout: Output::Capture,
                ..Default::default()
            },
        )?;
        let stdout = process
            .stdout()
            .take()
            .ok_or_else(|| eyre::eyre!("cordova output wasn't captured"))?;
        let mut lines = BufReader::new(stdout).lines();
        let mut version = None;
        while let Some(line) = lines.next_line().await? {
            if let Some(v) = version_line(&line) {
                version = Some(v.to_string());
                break;
            }
        }
        process.wait().await?;
        version.ok_or_else(|| eyre::eyre!("couldn't get cordova version from output"))
    }
}

fn version_line(line: &str) -> Option<&str> {
    Some(line.trim()).filter(|s| !s.is_empty())
}
