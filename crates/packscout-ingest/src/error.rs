//! Ingestion error types

use packscout_common::ConfigError;
use packscout_core::DomainError;
use thiserror::Error;

/// Errors that stop an ingestion run
#[derive(Debug, Error)]
pub enum IngestError {
    /// Cache or other collaborator failure that cannot be recovered locally
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persisting a live message failed; the feed cannot replay it later
    #[error("Source {name} halted: {error}")]
    SourceHalted {
        name: String,
        #[source]
        error: DomainError,
    },

    /// A collaborator could not be set up
    #[error("Startup failed: {0}")]
    Startup(String),
}

impl IngestError {
    /// Create a startup error
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Get the error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Config(_) => "CONFIG_ERROR",
            Self::SourceHalted { .. } => "SOURCE_HALTED",
            Self::Startup(_) => "STARTUP_ERROR",
        }
    }
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
