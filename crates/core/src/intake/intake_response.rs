use serde::Serialize;

use crate::shared::stored_artifact::StoredArtifact;

/// Successful outcome of one upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IntakeResponse {
    /// Stored and transcribed.
    Transcribed {
        artifact: StoredArtifact,
        transcript: String,
    },
    /// Stored; no transcriber is configured.
    Stored { artifact: StoredArtifact },
}

impl IntakeResponse {
    pub fn artifact(&self) -> &StoredArtifact {
        match self {
            IntakeResponse::Transcribed { artifact, .. } | IntakeResponse::Stored { artifact } => {
                artifact
            }
        }
    }

    pub fn transcript(&self) -> Option<&str> {
        match self {
            IntakeResponse::Transcribed { transcript, .. } => Some(transcript),
            IntakeResponse::Stored { .. } => None,
        }
    }
}
