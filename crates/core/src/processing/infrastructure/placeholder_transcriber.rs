use crate::processing::domain::transcriber::{TranscribeError, Transcriber};
use crate::shared::stored_artifact::StoredArtifact;

/// Stand-in transcriber that reports which file it was handed.
///
/// Used until a real speech-to-text backend is configured.
pub struct PlaceholderTranscriber;

impl PlaceholderTranscriber {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaceholderTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcriber for PlaceholderTranscriber {
    fn transcribe(&self, artifact: &StoredArtifact) -> Result<String, TranscribeError> {
        Ok(format!("Transcript of {}", artifact.stored_name))
    }
}
