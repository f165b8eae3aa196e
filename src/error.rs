//! Error taxonomy for the locate pipeline.
//!
//! Every variant is fatal to the run. Library functions return
//! [`Result`]; the binary adds context with `anyhow` and maps variants to
//! exit codes via [`LocateError::exit_code`].

use crate::platform::ExitCode;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, LocateError>;

#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    /// Invalid worker count, batch size, missing pattern input, bad ID regex
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A pattern could not be turned into a valid matcher
    #[error("failed to compile pattern '{name}' (expression: {expression}): {message}")]
    PatternCompile {
        name: String,
        expression: String,
        message: String,
    },

    /// Reading or decoding the next batch of records failed
    #[error("failed to read records from {source_name}: {message}")]
    ChunkSource {
        source_name: String,
        message: String,
    },

    /// A matcher failed (or panicked) while processing a batch
    #[error("worker failed on batch {batch}: {message}")]
    Worker { batch: u64, message: String },

    /// The reorder buffer observed a batch id it can never flush
    #[error("pipeline invariant violated: {0}")]
    InvariantViolation(String),

    /// Output or input I/O failure outside record decoding
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The run was cancelled by a signal
    #[error("processing cancelled")]
    Cancelled,
}

impl LocateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn chunk_source(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::ChunkSource {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Exit code the binary should terminate with for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::PatternCompile { .. } => ExitCode::InvalidUsage,
            Self::Cancelled => ExitCode::SignalInt,
            Self::Io(e) if crate::platform::is_broken_pipe(e) => ExitCode::SignalPipe,
            _ => ExitCode::GeneralError,
        }
    }

    /// Worker failures outrank the downstream errors they cause
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Self::Worker { .. } => 4,
            Self::ChunkSource { .. } => 3,
            Self::Io(_) => 2,
            Self::InvariantViolation(_) => 1,
            _ => 0,
        }
    }
}
