//! Adapters for the wrapped knowledge-graph-construction tools.
//!
//! Each adapter translates a [`MappingRequest`](crate::MappingRequest) into
//! the tool's native invocation (a generated config file or a command
//! line), then delegates to the [`ContainerRuntime`] and waits for the
//! container to exit.
//!
//! Concurrent invocations of the same tool against the same data directory
//! race on the generated config file; serializing them is the caller's
//! responsibility.

mod morphkgc;
mod souffle;

pub use morphkgc::MorphKgc;
pub use souffle::Souffle;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::container::{ContainerRuntime, ContainerSpec};
use crate::error::{Error, Result};

/// Mount point of the case's `shared` directory inside every tool
/// container.
pub(crate) const SHARED_MOUNT: &str = "/data/shared";

/// Create the tool's subdirectory under the case data directory.
/// Idempotent; the directory is made world-writable so the container user
/// can write into it regardless of uid mapping.
pub(crate) fn provision_tool_dir(data_dir: &Path, tool: &str) -> Result<PathBuf> {
    let dir = data_dir.join(tool);
    fs::create_dir_all(&dir).map_err(|err| {
        Error::Configuration(format!("cannot create {}: {err}", dir.display()))
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o777)).map_err(|err| {
            Error::Configuration(format!(
                "cannot set permissions on {}: {err}",
                dir.display()
            ))
        })?;
    }
    Ok(dir)
}

/// Run `command` in the tool's container, giving up after `ceiling`.
///
/// A run that overruns the ceiling is stopped explicitly, logged once at
/// warning level and reported as a plain failure; only validation and
/// runtime-invocation problems surface as errors.
pub(crate) async fn run_with_deadline(
    runtime: &Arc<dyn ContainerRuntime>,
    spec: &ContainerSpec,
    command: &str,
    ceiling: Duration,
) -> Result<bool> {
    match tokio::time::timeout(ceiling, runtime.run_and_wait_for_exit(spec, command)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Timeout ({}s) reached for {}", ceiling.as_secs(), spec.name);
            if let Err(err) = runtime.stop(&spec.name).await {
                error!("failed to stop {} after timeout: {err}", spec.name);
            }
            Ok(false)
        }
    }
}
