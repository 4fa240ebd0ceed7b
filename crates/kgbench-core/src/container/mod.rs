mod docker;

pub use docker::DockerCli;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

/// A host directory mounted into a tool container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host: PathBuf,
    pub container: String,
}

impl VolumeMount {
    pub fn new(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }
}

/// Identity of the container a tool adapter runs in: image reference,
/// container name and volume mounts. Registered once at adapter
/// construction and reused for every invocation.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    pub name: String,
    pub volumes: Vec<VolumeMount>,
}

/// The containerized-process runner the adapters delegate to.
///
/// Image pulling, volume mounting, process start/stop and log capture all
/// live behind this trait; the adapters only configure and invoke it.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Start the container described by `spec`, run `command` in it and
    /// wait until it exits. Returns whether the process exited
    /// successfully.
    async fn run_and_wait_for_exit(&self, spec: &ContainerSpec, command: &str) -> Result<bool>;

    /// Force-stop a container previously started through
    /// [`ContainerRuntime::run_and_wait_for_exit`]. Called when an
    /// execution overruns its deadline so the process is killed rather
    /// than abandoned.
    async fn stop(&self, name: &str) -> Result<()>;
}
