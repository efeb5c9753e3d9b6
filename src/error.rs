//! Failures that abort a cleaning run.

use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("raw input not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to open raw input {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as CSV: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("raw input is missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("failed to write cleaned output {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, CleanError>;
