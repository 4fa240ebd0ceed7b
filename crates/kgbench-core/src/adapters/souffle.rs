//! Souffle is a Datalog engine; mappings are first translated into Datalog
//! rules by the rulegen jar bundled in the container image.

use std::sync::Arc;
use std::time::Duration;

use sysinfo::System;

use crate::config::HarnessConfig;
use crate::container::{ContainerRuntime, ContainerSpec, VolumeMount};
use crate::error::Result;
use crate::mapping::{MappingRequest, Serialization};

use super::{provision_tool_dir, run_with_deadline, SHARED_MOUNT};

const VERSION: &str = "1.0.0";
const TIMEOUT: Duration = Duration::from_secs(3 * 3600);

/// Adapter for the Souffle reasoner.
///
/// Souffle's rulegen takes everything on the command line, so no config
/// file is generated; the request is translated into an argument vector
/// instead.
pub struct Souffle {
    spec: ContainerSpec,
    runtime: Arc<dyn ContainerRuntime>,
    max_heap_bytes: u64,
}

impl Souffle {
    pub fn new(config: &HarnessConfig, runtime: Arc<dyn ContainerRuntime>) -> Result<Self> {
        let tool_dir = provision_tool_dir(&config.data_dir, "souffle")?;
        let spec = ContainerSpec {
            image: format!("alloka/souffle:v{VERSION}"),
            name: "Souffle".to_string(),
            volumes: vec![
                VolumeMount::new(&tool_dir, "/data"),
                VolumeMount::new(config.shared_dir(), SHARED_MOUNT),
            ],
        };

        // rulegen gets half of physical memory as a fixed JVM heap.
        let mut system = System::new();
        system.refresh_memory();
        let max_heap_bytes = system.total_memory() / 2;

        Ok(Self {
            spec,
            runtime,
            max_heap_bytes,
        })
    }

    /// Translate `request` into the rulegen command line. Credentials go
    /// on the command line in the clear because the tool has no other
    /// channel for them; the command must not be logged.
    fn build_command(&self, request: &MappingRequest) -> Result<String> {
        // The serialization keyword does not appear in the command, but an
        // unsupported one still has to fail loudly instead of being
        // ignored.
        Serialization::from_keyword(&request.serialization)?;

        let heap = self.max_heap_bytes;
        let mut command = format!(
            "java -Xmx{heap} -Xms{heap} -jar rulegen.jar -m {SHARED_MOUNT}/{}",
            request.mapping_file
        );
        if let Some(rdb) = &request.rdb {
            command.push_str(&format!(
                " -u {} -p {} -dsn '{}'",
                rdb.username,
                rdb.password,
                rdb.jdbc_dsn()
            ));
        }
        Ok(command)
    }

    /// Run rulegen on the mapping file and wait for it to finish.
    /// Validation problems are errors; a failed or timed-out run is
    /// `Ok(false)`.
    pub async fn execute_mapping(&self, request: &MappingRequest) -> Result<bool> {
        let command = self.build_command(request)?;
        run_with_deadline(&self.runtime, &self.spec, &command, TIMEOUT).await
    }
}
