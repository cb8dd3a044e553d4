use crate::shared::stored_artifact::StoredArtifact;

pub type TranscribeError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for the step that turns a stored upload into text.
///
/// Implementations only read the artifact. Whatever they do inside (model
/// inference, an external service, a subprocess) is invisible to intake.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, artifact: &StoredArtifact) -> Result<String, TranscribeError>;
}
