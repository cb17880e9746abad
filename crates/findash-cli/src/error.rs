use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] findash_core::ValidationError),

    #[error(transparent)]
    Config(#[from] findash_core::ConfigError),

    #[error(transparent)]
    Store(#[from] findash_core::StoreError),

    #[error(transparent)]
    Read(#[from] findash_core::ReadError),

    #[error(transparent)]
    Ingest(#[from] findash_core::IngestError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Serialization(_) => 4,
            Self::Store(_) | Self::Read(_) | Self::Ingest(_) => 7,
            Self::Io(_) => 10,
        }
    }
}
