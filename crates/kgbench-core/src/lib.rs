pub mod adapters;
pub mod config;
pub mod container;
pub mod error;
pub mod ini;
pub mod mapping;

pub use adapters::{MorphKgc, Souffle};
pub use config::HarnessConfig;
pub use container::{ContainerRuntime, ContainerSpec, DockerCli, VolumeMount};
pub use error::{Error, Result};
pub use mapping::{MappingRequest, RdbDescriptor, RdbType, Serialization};
