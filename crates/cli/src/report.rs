use serde::Serialize;

use vidscribe_core::intake::intake_error::IntakeError;
use vidscribe_core::intake::intake_response::IntakeResponse;

pub const STATUS_OK: u16 = 200;
pub const STATUS_FAILED: u16 = 500;

/// One printed result line per input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub input: String,
    pub status: u16,
    pub body: ReportBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Transcript {
        stored_name: String,
        transcript: String,
    },
    Stored {
        stored_name: String,
    },
    Error {
        error: String,
        kind: String,
        /// Set when the upload was kept despite the failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        stored_name: Option<String>,
    },
}

impl UploadReport {
    pub fn from_outcome(input: impl Into<String>, outcome: &Result<IntakeResponse, IntakeError>) -> Self {
        let (status, body) = match outcome {
            Ok(IntakeResponse::Transcribed {
                artifact,
                transcript,
            }) => (
                STATUS_OK,
                ReportBody::Transcript {
                    stored_name: artifact.stored_name.clone(),
                    transcript: transcript.clone(),
                },
            ),
            Ok(IntakeResponse::Stored { artifact }) => (
                STATUS_OK,
                ReportBody::Stored {
                    stored_name: artifact.stored_name.clone(),
                },
            ),
            Err(e) => (
                STATUS_FAILED,
                ReportBody::Error {
                    error: e.to_string(),
                    kind: e.kind().to_string(),
                    stored_name: e.stored_artifact().map(|a| a.stored_name.clone()),
                },
            ),
        };
        Self {
            input: input.into(),
            status,
            body,
        }
    }

    /// The input could not be opened, so no upload was attempted.
    pub fn unreadable(input: impl Into<String>, error: &std::io::Error) -> Self {
        let input = input.into();
        Self {
            body: ReportBody::Error {
                error: format!("cannot open {input}: {error}"),
                kind: "invalid_input".to_string(),
                stored_name: None,
            },
            input,
            status: STATUS_FAILED,
        }
    }

    /// The worker handling this input died before reporting.
    pub fn lost(input: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            body: ReportBody::Error {
                error: format!("upload of {input} was interrupted by a worker panic"),
                kind: "internal_error".to_string(),
                stored_name: None,
            },
            input,
            status: STATUS_FAILED,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}
