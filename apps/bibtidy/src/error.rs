//! Error types for the bibtidy CLI

use std::io;
use std::path::PathBuf;

use bibtidy_bibtex::ParseError;
use bibtidy_core::ConfigError;
use thiserror::Error;

/// Fatal errors; any of these aborts the run before output is written
#[derive(Error, Debug)]
pub enum AppError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
