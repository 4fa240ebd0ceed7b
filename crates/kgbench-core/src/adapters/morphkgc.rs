//! Morph-KGC constructs RDF and RDF-star knowledge graphs from
//! heterogeneous data sources with the R2RML, RML and RML-star mapping
//! languages.
//!
//! Website: <https://morph-kgc.readthedocs.io/>

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HarnessConfig;
use crate::container::{ContainerRuntime, ContainerSpec, VolumeMount};
use crate::error::Result;
use crate::ini::IniFile;
use crate::mapping::{MappingRequest, Serialization};

use super::{provision_tool_dir, run_with_deadline, SHARED_MOUNT};

const VERSION: &str = "2.2.0";
const TIMEOUT: Duration = Duration::from_secs(6 * 3600);
const CONFIG_FILE: &str = "config_morphkgc.ini";
const ENTRY_COMMAND: &str = "python3 -m morph_kgc /data/config_morphkgc.ini";

/// Adapter for the Morph-KGC mapping engine.
///
/// Morph-KGC has no CLI flags for what we need, so every invocation writes
/// an INI config into the tool's data volume and points the fixed entry
/// command at it.
pub struct MorphKgc {
    tool_dir: PathBuf,
    spec: ContainerSpec,
    runtime: Arc<dyn ContainerRuntime>,
}

impl MorphKgc {
    pub fn new(config: &HarnessConfig, runtime: Arc<dyn ContainerRuntime>) -> Result<Self> {
        let tool_dir = provision_tool_dir(&config.data_dir, "morphkgc")?;
        let spec = ContainerSpec {
            image: format!("blindreviewing/morph-kgc:v{VERSION}"),
            name: "Morph-KGC".to_string(),
            volumes: vec![
                VolumeMount::new(&tool_dir, "/data"),
                VolumeMount::new(config.shared_dir(), SHARED_MOUNT),
            ],
        };
        Ok(Self {
            tool_dir,
            spec,
            runtime,
        })
    }

    /// Render the INI config for `request` without touching the
    /// filesystem. Fails before anything is written when the request does
    /// not validate.
    fn render_config(request: &MappingRequest) -> Result<String> {
        let serialization = Serialization::from_keyword(&request.serialization)?;

        let mut config = IniFile::new();
        config.set("CONFIGURATION", "output_format", serialization.output_format());
        if request.multiple_files {
            // Mapping partition results stay in separate files under the
            // shared directory.
            config.set("CONFIGURATION", "output_dir", format!("{SHARED_MOUNT}/"));
        } else {
            config.set(
                "CONFIGURATION",
                "output_file",
                format!("{SHARED_MOUNT}/{}", request.output_file),
            );
        }
        config.set(
            "DataSource0",
            "mappings",
            format!("{SHARED_MOUNT}/{}", request.mapping_file),
        );
        if let Some(rdb) = &request.rdb {
            // The DSN embeds the password in clear text because that is
            // what Morph-KGC expects in its config file. It must not
            // appear in any log output.
            config.set("DataSource0", "db_url", rdb.sqlalchemy_dsn());
        }
        Ok(config.to_string())
    }

    /// Translate `request` into `config_morphkgc.ini` and run the engine,
    /// waiting for it to finish. Validation problems are errors; a failed
    /// or timed-out run is `Ok(false)`.
    pub async fn execute_mapping(&self, request: &MappingRequest) -> Result<bool> {
        let rendered = Self::render_config(request)?;
        fs::write(self.tool_dir.join(CONFIG_FILE), rendered)?;

        run_with_deadline(&self.runtime, &self.spec, ENTRY_COMMAND, TIMEOUT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::instrument::WithSubscriber;

    use crate::adapters::testing::{Behavior, LogBuffer, MockRuntime};
    use crate::error::Error;
    use crate::mapping::{RdbDescriptor, RdbType};

    fn harness(behavior: Behavior) -> (tempfile::TempDir, HarnessConfig, Arc<MockRuntime>) {
        let data = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new(data.path());
        let runtime = Arc::new(MockRuntime::new(behavior));
        (data, config, runtime)
    }

    fn request() -> MappingRequest {
        MappingRequest::new("map.rml.ttl", "out.nt", "ntriples")
    }

    #[tokio::test]
    async fn executes_mapping_end_to_end() {
        let (data, config, runtime) = harness(Behavior::Exit(true));
        let adapter = MorphKgc::new(&config, runtime.clone()).unwrap();

        let success = adapter.execute_mapping(&request()).await.unwrap();
        assert!(success);

        let generated =
            fs::read_to_string(data.path().join("morphkgc").join(CONFIG_FILE)).unwrap();
        assert!(generated.contains("output_format = N-TRIPLES"));
        assert!(generated.contains("output_file = /data/shared/out.nt"));
        assert!(generated.contains("mappings = /data/shared/map.rml.ttl"));
        assert!(!generated.contains("output_dir"));

        let commands = runtime.commands.lock().unwrap();
        assert_eq!(commands.as_slice(), [ENTRY_COMMAND]);
    }

    #[tokio::test]
    async fn reports_tool_failure_as_false() {
        let (_data, config, runtime) = harness(Behavior::Exit(false));
        let adapter = MorphKgc::new(&config, runtime).unwrap();

        let success = adapter.execute_mapping(&request()).await.unwrap();
        assert!(!success);
    }

    #[tokio::test]
    async fn rejects_unsupported_serialization_without_writing() {
        let (data, config, runtime) = harness(Behavior::Exit(true));
        let adapter = MorphKgc::new(&config, runtime.clone()).unwrap();

        let mut request = request();
        request.serialization = "turtle".to_string();

        let err = adapter.execute_mapping(&request).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedSerialization(k) if k == "turtle"));
        assert!(!data.path().join("morphkgc").join(CONFIG_FILE).exists());
        assert!(runtime.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn nquads_maps_to_tool_format() {
        let (data, config, runtime) = harness(Behavior::Exit(true));
        let adapter = MorphKgc::new(&config, runtime).unwrap();

        let mut request = request();
        request.serialization = "nquads".to_string();
        adapter.execute_mapping(&request).await.unwrap();

        let generated =
            fs::read_to_string(data.path().join("morphkgc").join(CONFIG_FILE)).unwrap();
        assert!(generated.contains("output_format = N-QUADS"));
    }

    #[tokio::test]
    async fn multiple_files_switches_to_output_dir() {
        let (data, config, runtime) = harness(Behavior::Exit(true));
        let adapter = MorphKgc::new(&config, runtime).unwrap();

        let mut request = request();
        request.multiple_files = true;
        adapter.execute_mapping(&request).await.unwrap();

        let generated =
            fs::read_to_string(data.path().join("morphkgc").join(CONFIG_FILE)).unwrap();
        assert!(generated.contains("output_dir = /data/shared/"));
        assert!(!generated.contains("output_file"));
    }

    #[tokio::test]
    async fn database_source_gets_a_db_url() {
        let (data, config, runtime) = harness(Behavior::Exit(true));
        let adapter = MorphKgc::new(&config, runtime).unwrap();

        let mut request = request();
        request.rdb = Some(RdbDescriptor {
            username: "root".into(),
            password: "hunter2".into(),
            host: "db".into(),
            port: 3306,
            name: "cases".into(),
            kind: RdbType::MySql,
        });
        adapter.execute_mapping(&request).await.unwrap();

        let generated =
            fs::read_to_string(data.path().join("morphkgc").join(CONFIG_FILE)).unwrap();
        assert!(generated.contains("db_url = mysql+pymysql://root:hunter2@db:3306/cases"));
    }

    #[tokio::test]
    async fn identical_requests_generate_identical_config() {
        let (data, config, runtime) = harness(Behavior::Exit(true));
        let adapter = MorphKgc::new(&config, runtime).unwrap();
        let path = data.path().join("morphkgc").join(CONFIG_FILE);

        adapter.execute_mapping(&request()).await.unwrap();
        let first = fs::read(&path).unwrap();
        adapter.execute_mapping(&request()).await.unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_degrades_to_failure_and_stops_the_container() {
        let (_data, config, runtime) = harness(Behavior::Hang);
        let adapter = MorphKgc::new(&config, runtime.clone()).unwrap();

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let success = adapter
            .execute_mapping(&request())
            .with_subscriber(subscriber)
            .await
            .unwrap();
        assert!(!success);

        let stopped = runtime.stopped.lock().unwrap();
        assert_eq!(stopped.as_slice(), ["Morph-KGC"]);

        // Exactly one warning, naming the tool and the ceiling.
        let contents = logs.contents();
        assert_eq!(contents.matches("WARN").count(), 1);
        assert!(contents.contains("Timeout (21600s) reached for Morph-KGC"));
    }
}
