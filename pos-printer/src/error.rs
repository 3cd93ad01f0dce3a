//! Error types for the printer library

use thiserror::Error;

/// Printer error types
///
/// Every variant is local to one print job: the dispatcher hands it to the
/// job's own caller and moves on to the next job.
#[derive(Debug, Error)]
pub enum PrintError {
    /// IO error writing or removing the spool file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The print command could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The print command exited with an error status
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The print command did not finish in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Printer name cannot be handed to the OS
    #[error("Invalid printer name: {0:?}")]
    InvalidPrinterName(String),

    /// The dispatcher stopped before the job was sent
    #[error("Print job abandoned: dispatcher stopped")]
    Abandoned,
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
