use std::process::{Command, Stdio};

use crate::processing::domain::transcriber::{TranscribeError, Transcriber};
use crate::shared::stored_artifact::StoredArtifact;

/// Transcribes by running an external program.
///
/// The stored file's path is appended as the final argument. Trimmed stdout
/// is the transcript; a spawn failure, a non-zero exit or non-UTF-8 output is
/// a failure carrying the program's stderr.
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds from `[program, args...]`.
    pub fn from_command_line(parts: &[String]) -> Result<Self, String> {
        match parts.split_first() {
            Some((program, args)) if !program.trim().is_empty() => {
                Ok(Self::new(program.clone(), args.to_vec()))
            }
            _ => Err("Transcriber command must name a program".to_string()),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Transcriber for CommandTranscriber {
    fn transcribe(&self, artifact: &StoredArtifact) -> Result<String, TranscribeError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&artifact.storage_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )
            .into());
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|_| format!("{} produced non-UTF-8 output", self.program))?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn artifact_at(path: PathBuf) -> StoredArtifact {
        StoredArtifact {
            stored_name: path.file_name().unwrap().to_string_lossy().into_owned(),
            storage_path: path,
            size_bytes: 0,
        }
    }

    #[test]
    fn test_from_command_line_requires_program() {
        assert!(CommandTranscriber::from_command_line(&[]).is_err());
        assert!(CommandTranscriber::from_command_line(&[" ".to_string()]).is_err());
        let t = CommandTranscriber::from_command_line(&["whisper".to_string(), "-m".to_string()])
            .unwrap();
        assert_eq!(t.program(), "whisper");
    }

    #[test]
    fn test_missing_program_is_a_failure() {
        let t = CommandTranscriber::new("/nonexistent/transcriber", vec![]);
        let err = t
            .transcribe(&artifact_at(PathBuf::from("clip.mp4")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to run"), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_becomes_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, "  hello from the clip \n").unwrap();

        // `sh -c script path`: the appended path arrives as $0.
        let t = CommandTranscriber::new("sh", vec!["-c".to_string(), "cat \"$0\"".to_string()]);
        let text = t.transcribe(&artifact_at(path.clone())).unwrap();

        assert_eq!(text, "hello from the clip");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "  hello from the clip \n");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_reports_stderr() {
        let t = CommandTranscriber::new(
            "sh",
            vec!["-c".to_string(), "echo 'model missing' >&2; exit 3".to_string()],
        );
        let err = t
            .transcribe(&artifact_at(PathBuf::from("clip.mp4")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("model missing"), "got: {err}");
        assert!(err.contains("sh exited"), "got: {err}");
    }
}
