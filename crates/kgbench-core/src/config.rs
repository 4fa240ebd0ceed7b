use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Harness configuration, passed explicitly into every adapter.
///
/// Adapters never mutate process-wide state (umask, working directory);
/// everything they need to know about the host comes through this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Root data directory of the benchmark case. Each tool gets its own
    /// subdirectory under it; the `shared` subdirectory is mounted into
    /// every tool container.
    pub data_dir: PathBuf,
    /// Explicit path to the docker client. Resolved from `PATH` when
    /// absent.
    #[serde(default)]
    pub docker_binary: Option<PathBuf>,
}

impl HarnessConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            docker_binary: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            Error::Configuration(format!("failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&contents).map_err(|err| {
            Error::Configuration(format!("failed to parse {}: {err}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                Error::Configuration(format!("failed to create {}: {err}", parent.display()))
            })?;
        }
        let rendered = toml::to_string_pretty(self).map_err(|err| {
            Error::Configuration(format!("failed to serialize config: {err}"))
        })?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Host path of the shared volume.
    pub fn shared_dir(&self) -> PathBuf {
        self.data_dir.join("shared")
    }
}
