use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ContainerRuntime, ContainerSpec};
use crate::error::{Error, Result};

/// Container runtime backed by the `docker` command line client.
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Use the given docker client, or resolve `docker` from `PATH`.
    pub fn new(binary: Option<PathBuf>) -> Result<Self> {
        let binary = match binary {
            Some(path) => path,
            None => which::which("docker").map_err(|err| {
                Error::Configuration(format!("docker client not found: {err}"))
            })?,
        };
        Ok(Self { binary })
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn run_and_wait_for_exit(&self, spec: &ContainerSpec, command: &str) -> Result<bool> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["run", "--rm", "--name"]).arg(&spec.name);
        for volume in &spec.volumes {
            cmd.arg("-v");
            cmd.arg(format!("{}:{}", volume.host.display(), volume.container));
        }
        cmd.arg(&spec.image);
        cmd.args(["sh", "-c", command]);

        debug!("starting container {} ({})", spec.name, spec.image);
        let status = cmd
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;
        Ok(status.success())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        let status = Command::new(&self.binary)
            .args(["rm", "-f", name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        if !status.success() {
            info!("container {name} was already gone");
        }
        Ok(())
    }
}
