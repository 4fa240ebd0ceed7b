use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use kgbench_core::{
    ContainerRuntime, DockerCli, HarnessConfig, MappingRequest, MorphKgc, RdbDescriptor, RdbType,
    Souffle,
};

#[derive(Parser)]
#[command(name = "kgbench", version, about = "Run knowledge-graph-construction tools in containers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a mapping with one of the wrapped tools.
    Run {
        /// Tool to execute the mapping with.
        #[arg(long, value_enum)]
        tool: Tool,
        /// Case data directory; overrides the config file.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Harness config file (default: ~/.kgbench/config.toml).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Mapping file name inside the shared directory.
        #[arg(long)]
        mapping: String,
        /// Output file name inside the shared directory.
        #[arg(long)]
        output: String,
        /// Serialization keyword: ntriples or nquads.
        #[arg(long)]
        serialization: String,
        /// Spread the generated triples over multiple output files.
        #[arg(long)]
        multiple_files: bool,
        #[arg(long)]
        rdb_username: Option<String>,
        #[arg(long)]
        rdb_password: Option<String>,
        #[arg(long)]
        rdb_host: Option<String>,
        #[arg(long)]
        rdb_port: Option<u16>,
        #[arg(long)]
        rdb_name: Option<String>,
        /// Database type: mysql or postgresql.
        #[arg(long)]
        rdb_type: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tool {
    Morphkgc,
    Souffle,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Run {
            tool,
            data_dir,
            config,
            mapping,
            output,
            serialization,
            multiple_files,
            rdb_username,
            rdb_password,
            rdb_host,
            rdb_port,
            rdb_name,
            rdb_type,
        } => {
            let kind = rdb_type.as_deref().map(RdbType::from_name).transpose()?;
            let rdb = RdbDescriptor::from_parts(
                rdb_username,
                rdb_password,
                rdb_host,
                rdb_port,
                rdb_name,
                kind,
            )?;
            let request = MappingRequest {
                mapping_file: mapping,
                output_file: output,
                serialization,
                rdb,
                multiple_files,
            };

            let config = resolve_config(data_dir, config)?;
            fs::create_dir_all(config.shared_dir()).with_context(|| {
                format!("cannot create {}", config.shared_dir().display())
            })?;
            let runtime: Arc<dyn ContainerRuntime> =
                Arc::new(DockerCli::new(config.docker_binary.clone())?);

            let success = match tool {
                Tool::Morphkgc => {
                    MorphKgc::new(&config, runtime)?
                        .execute_mapping(&request)
                        .await?
                }
                Tool::Souffle => {
                    Souffle::new(&config, runtime)?
                        .execute_mapping(&request)
                        .await?
                }
            };
            Ok(success)
        }
    }
}

fn resolve_config(data_dir: Option<PathBuf>, config: Option<PathBuf>) -> Result<HarnessConfig> {
    if let Some(dir) = data_dir {
        return Ok(HarnessConfig::new(dir));
    }
    let path = match config {
        Some(path) => path,
        None => default_config_path().context("could not determine home directory")?,
    };
    if !path.exists() {
        bail!(
            "no data directory given and no config file at {}",
            path.display()
        );
    }
    Ok(HarnessConfig::load(&path)?)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kgbench").join("config.toml"))
}
