use thiserror::Error;

use crate::shared::stored_artifact::StoredArtifact;
use crate::storage::storage_error::StorageError;

/// Why an upload did not produce a successful response.
///
/// `Storage` means nothing was kept. `Processing` means the upload was stored
/// and kept, and only the transcription step failed.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("invalid upload: {0}")]
    InvalidInput(String),
    #[error("failed to store {requested_name}: {source}")]
    Storage {
        requested_name: String,
        #[source]
        source: StorageError,
    },
    #[error("processing failed for {}: {reason}", artifact.stored_name)]
    Processing {
        artifact: StoredArtifact,
        reason: String,
    },
}

impl IntakeError {
    /// Stable machine-readable label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeError::InvalidInput(_) => "invalid_input",
            IntakeError::Storage { .. } => "storage_error",
            IntakeError::Processing { .. } => "processing_error",
        }
    }

    /// The artifact that was kept despite the failure, if any.
    pub fn stored_artifact(&self) -> Option<&StoredArtifact> {
        match self {
            IntakeError::Processing { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kinds_are_distinct() {
        let artifact = StoredArtifact {
            stored_name: "clip.mp4".to_string(),
            storage_path: PathBuf::from("clip.mp4"),
            size_bytes: 1,
        };
        let errors = [
            IntakeError::InvalidInput("empty".to_string()),
            IntakeError::Storage {
                requested_name: "clip.mp4".to_string(),
                source: StorageError::TooLarge { limit: 1 },
            },
            IntakeError::Processing {
                artifact,
                reason: "model missing".to_string(),
            },
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), 3);
    }

    #[test]
    fn test_processing_error_keeps_artifact() {
        let err = IntakeError::Processing {
            artifact: StoredArtifact {
                stored_name: "clip_1.mp4".to_string(),
                storage_path: PathBuf::from("uploads/clip_1.mp4"),
                size_bytes: 9,
            },
            reason: "timeout".to_string(),
        };
        assert_eq!(err.stored_artifact().unwrap().stored_name, "clip_1.mp4");
        assert_eq!(err.to_string(), "processing failed for clip_1.mp4: timeout");
    }

    #[test]
    fn test_storage_error_keeps_nothing() {
        let err = IntakeError::Storage {
            requested_name: "clip.mp4".to_string(),
            source: StorageError::TooLarge { limit: 5 },
        };
        assert!(err.stored_artifact().is_none());
        assert!(err.to_string().starts_with("failed to store clip.mp4"));
    }
}
