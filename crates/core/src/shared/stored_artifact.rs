use std::path::PathBuf;

use serde::Serialize;

/// A completed upload as it exists in its namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub stored_name: String,
    pub storage_path: PathBuf,
    pub size_bytes: u64,
}
