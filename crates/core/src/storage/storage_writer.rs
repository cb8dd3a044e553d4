use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::shared::constants::{
    DEFAULT_COPY_BUFFER_SIZE, PARTIAL_FILE_PREFIX, PARTIAL_FILE_SUFFIX,
};
use crate::shared::stored_artifact::StoredArtifact;

use super::directory_namespace::NameReservation;
use super::storage_error::StorageError;

/// Progress callback: `(stored_name, bytes_written_so_far)`.
pub type ProgressFn = Box<dyn Fn(&str, u64) + Send + Sync>;

type DirSyncFn = fn(&Path) -> io::Result<()>;

/// Streams an upload into its reserved name.
///
/// Data goes to a temp file in the namespace's partial directory, is flushed
/// and synced, then renamed onto the target without replacing anything
/// already there. The temp file deletes itself when dropped, so every failure
/// path (read error, write error, size limit, unwinding) leaves neither a
/// partial file nor a committed name behind.
pub struct StorageWriter {
    buffer_size: usize,
    max_bytes: Option<u64>,
    progress: Option<ProgressFn>,
    dir_sync: DirSyncFn,
}

impl StorageWriter {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            max_bytes: None,
            progress: None,
            dir_sync: sync_dir,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Rejects uploads larger than `limit` bytes.
    pub fn with_max_bytes(mut self, limit: u64) -> Self {
        self.max_bytes = Some(limit);
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn write(
        &self,
        reservation: &NameReservation<'_>,
        stream: &mut dyn Read,
    ) -> Result<StoredArtifact, StorageError> {
        let namespace = reservation.namespace();
        let target = reservation.target_path();

        let partial = tempfile::Builder::new()
            .prefix(PARTIAL_FILE_PREFIX)
            .suffix(PARTIAL_FILE_SUFFIX)
            .tempfile_in(namespace.partial_dir())
            .map_err(|e| StorageError::Write {
                path: namespace.partial_dir().to_path_buf(),
                source: e,
            })?;

        let size_bytes = self.copy(reservation.name(), stream, &partial)?;

        partial
            .as_file()
            .sync_all()
            .map_err(|e| StorageError::Write {
                path: partial.path().to_path_buf(),
                source: e,
            })?;

        partial.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                StorageError::AlreadyExists {
                    name: reservation.name().to_string(),
                }
            } else {
                StorageError::Write {
                    path: target.clone(),
                    source: e.error,
                }
            }
        })?;
        // The file is already at its final name; take it back out so a failed
        // write keeps nothing.
        if let Err(e) = (self.dir_sync)(namespace.root()) {
            if let Err(remove_err) = fs::remove_file(&target) {
                log::warn!("Failed to remove {}: {remove_err}", target.display());
            }
            return Err(StorageError::Write {
                path: namespace.root().to_path_buf(),
                source: e,
            });
        }

        Ok(StoredArtifact {
            stored_name: reservation.name().to_string(),
            storage_path: target,
            size_bytes,
        })
    }

    fn copy(
        &self,
        stored_name: &str,
        stream: &mut dyn Read,
        partial: &NamedTempFile,
    ) -> Result<u64, StorageError> {
        let write_err = |e| StorageError::Write {
            path: partial.path().to_path_buf(),
            source: e,
        };
        let mut file: &File = partial.as_file();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut written: u64 = 0;

        loop {
            let n = match stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StorageError::Read(e)),
            };
            if let Some(limit) = self.max_bytes {
                if written + n as u64 > limit {
                    return Err(StorageError::TooLarge { limit });
                }
            }
            file.write_all(&buffer[..n]).map_err(write_err)?;
            written += n as u64;
            if let Some(ref cb) = self.progress {
                cb(stored_name, written);
            }
        }

        file.flush().map_err(write_err)?;
        Ok(written)
    }
}

impl Default for StorageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Makes the rename itself durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
