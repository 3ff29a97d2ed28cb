//! Error types.
//!
//! None of these reach the cart UI: the controller logs them and keeps
//! rendering from the last good state. They exist so the layers below it
//! can propagate failures with `?`.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key {0:?} contains characters that cannot be stored")]
    InvalidKey(String),
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize cart")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),
}
