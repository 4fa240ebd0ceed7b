use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported serialization: \"{0}\"")]
    UnsupportedSerialization(String),

    #[error("Unknown RDB type: \"{0}\"")]
    UnsupportedDatabase(String),

    #[error(
        "Incomplete database descriptor: username, password, host, port, \
         name and type must be given together"
    )]
    PartialRdbDescriptor,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
