use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to prepare storage directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read upload stream: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("stored name {name} is already in use")]
    AlreadyExists { name: String },
    #[error("failed to list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
