use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::naming::domain::name_resolver::NameResolver;
use crate::processing::domain::transcriber::Transcriber;
use crate::shared::file_name::last_segment;
use crate::shared::stored_artifact::StoredArtifact;
use crate::storage::directory_namespace::DirectoryNamespace;
use crate::storage::storage_writer::StorageWriter;

use super::intake_error::IntakeError;
use super::intake_response::IntakeResponse;
use super::upload_request::UploadRequest;

/// Where an upload is in its lifecycle. Every request ends in `Responded` or
/// `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Received,
    NameResolved,
    Stored,
    Processed,
    Responded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Received => "received",
            Stage::NameResolved => "name resolved",
            Stage::Stored => "stored",
            Stage::Processed => "processed",
            Stage::Responded => "responded",
            Stage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Stores one upload under a collision-free name, then hands it to the
/// transcriber.
///
/// Safe to share between threads: every call works on its own request, and
/// the only shared state is the namespace, which serialises name reservation
/// internally.
pub struct IntakeUseCase {
    namespace: Arc<DirectoryNamespace>,
    resolver: Box<dyn NameResolver>,
    writer: StorageWriter,
    transcriber: Option<Box<dyn Transcriber>>,
}

impl IntakeUseCase {
    pub fn new(
        namespace: Arc<DirectoryNamespace>,
        resolver: Box<dyn NameResolver>,
        writer: StorageWriter,
        transcriber: Option<Box<dyn Transcriber>>,
    ) -> Self {
        Self {
            namespace,
            resolver,
            writer,
            transcriber,
        }
    }

    pub fn namespace(&self) -> &DirectoryNamespace {
        &self.namespace
    }

    pub fn handle(&self, request: UploadRequest) -> Result<IntakeResponse, IntakeError> {
        let UploadRequest {
            declared_filename,
            mut byte_stream,
        } = request;
        trace(&declared_filename, Stage::Received);

        // 1. Validate the declared name
        let requested_name = validate_filename(&declared_filename).map_err(|e| {
            log::warn!("Rejected upload {declared_filename:?}: {e}");
            trace(&declared_filename, Stage::Failed);
            e
        })?;

        // 2. Reserve a free name (the namespace lock is released on return)
        let reservation = self.namespace.reserve(requested_name, self.resolver.as_ref());
        trace(&declared_filename, Stage::NameResolved);

        // 3. Stream to disk; the reservation is dropped once the file exists
        let artifact = self
            .writer
            .write(&reservation, &mut *byte_stream)
            .map_err(|source| {
                log::warn!("Failed to store {}: {source}", reservation.name());
                trace(&declared_filename, Stage::Failed);
                IntakeError::Storage {
                    requested_name: requested_name.to_string(),
                    source,
                }
            })?;
        drop(reservation);
        trace(&declared_filename, Stage::Stored);
        log::info!(
            "Stored {} as {} ({} bytes)",
            declared_filename,
            artifact.stored_name,
            artifact.size_bytes
        );

        // 4. Transcribe; failures keep the stored file
        let Some(ref transcriber) = self.transcriber else {
            trace(&declared_filename, Stage::Responded);
            return Ok(IntakeResponse::Stored { artifact });
        };
        let transcript = match run_transcriber(transcriber.as_ref(), &artifact) {
            Ok(text) => text,
            Err(reason) => {
                log::warn!("Transcription failed for {}: {reason}", artifact.stored_name);
                trace(&declared_filename, Stage::Failed);
                return Err(IntakeError::Processing { artifact, reason });
            }
        };
        trace(&declared_filename, Stage::Processed);

        // 5. Respond
        log::info!("Transcribed {}", artifact.stored_name);
        trace(&declared_filename, Stage::Responded);
        Ok(IntakeResponse::Transcribed {
            artifact,
            transcript,
        })
    }
}

fn trace(declared_filename: &str, stage: Stage) {
    log::debug!("Upload {declared_filename:?}: {stage}");
}

/// Reduces the declared name to its last path segment and rejects names that
/// cannot be stored.
fn validate_filename(declared: &str) -> Result<&str, IntakeError> {
    let name = last_segment(declared);
    if name.trim().is_empty() {
        return Err(IntakeError::InvalidInput(
            "declared filename is empty".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(IntakeError::InvalidInput(format!(
            "declared filename {name:?} is not a file name"
        )));
    }
    if name.contains('\0') {
        return Err(IntakeError::InvalidInput(
            "declared filename contains a NUL byte".to_string(),
        ));
    }
    Ok(name)
}

/// Runs the transcriber, turning both errors and panics into a reason string.
fn run_transcriber(transcriber: &dyn Transcriber, artifact: &StoredArtifact) -> Result<String, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| transcriber.transcribe(artifact))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_reason(payload.as_ref())),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("transcriber panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("transcriber panicked: {msg}")
    } else {
        "transcriber panicked".to_string()
    }
}
