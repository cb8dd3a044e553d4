use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::naming::domain::name_resolver::{NameLookup, NameResolver};
use crate::shared::constants::PARTIAL_DIR_NAME;

use super::storage_error::StorageError;

/// A flat directory of stored uploads.
///
/// A file in the root is a committed upload; its presence is the only record
/// kept. Names handed out but not yet committed are tracked in memory, and the
/// lock guarding them is held only while a name is resolved and reserved,
/// never while data is copied.
///
/// The lock belongs to this value. Open each root once and share it (e.g.
/// behind an `Arc`) between the threads uploading into it.
#[derive(Debug)]
pub struct DirectoryNamespace {
    root: PathBuf,
    partial_dir: PathBuf,
    reserved: Mutex<HashSet<String>>,
}

impl DirectoryNamespace {
    /// Opens the namespace at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        let partial_dir = root.join(PARTIAL_DIR_NAME);
        fs::create_dir_all(&partial_dir).map_err(|e| StorageError::Prepare {
            path: partial_dir.clone(),
            source: e,
        })?;
        Ok(Self {
            root,
            partial_dir,
            reserved: Mutex::new(HashSet::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for in-flight writes. Lives inside the root so commits are
    /// same-filesystem renames.
    pub fn partial_dir(&self) -> &Path {
        &self.partial_dir
    }

    pub fn path_of(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }

    /// Whether `stored_name` has been committed.
    pub fn contains(&self, stored_name: &str) -> bool {
        self.path_of(stored_name).is_file()
    }

    /// Resolves a free name for `requested_name` and reserves it until the
    /// returned guard is dropped.
    ///
    /// Resolution and reservation happen under one lock acquisition, so two
    /// callers can never be handed the same name.
    ///
    /// Names are compared byte for byte. On a case-insensitive filesystem two
    /// in-flight uploads differing only in case (`Clip.mp4`, `clip.mp4`) both
    /// get their name; the second to commit fails with
    /// [`StorageError::AlreadyExists`] instead of overwriting.
    pub fn reserve(&self, requested_name: &str, resolver: &dyn NameResolver) -> NameReservation<'_> {
        let mut reserved = self.lock_reserved();
        let name = resolver.resolve(
            requested_name,
            &ReservedView {
                root: &self.root,
                reserved: &reserved,
            },
        );
        reserved.insert(name.clone());
        log::debug!("Reserved {name} for {requested_name}");
        NameReservation {
            namespace: self,
            name,
        }
    }

    /// Committed names, sorted.
    pub fn stored_names(&self) -> Result<Vec<String>, StorageError> {
        let list_err = |e| StorageError::List {
            path: self.root.clone(),
            source: e,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            if !entry.file_type().map_err(list_err)?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn lock_reserved(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a resolver panicked mid-call.
        self.reserved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, name: &str) {
        self.lock_reserved().remove(name);
    }
}

struct ReservedView<'a> {
    root: &'a Path,
    reserved: &'a HashSet<String>,
}

impl NameLookup for ReservedView<'_> {
    fn is_taken(&self, name: &str) -> bool {
        // symlink_metadata so that dangling links and directories count too.
        self.reserved.contains(name) || fs::symlink_metadata(self.root.join(name)).is_ok()
    }
}

/// A stored name held for one upload.
///
/// Dropping it frees the name again. After a successful commit the file itself
/// keeps the name taken, so drop order relative to the commit is safe.
#[derive(Debug)]
pub struct NameReservation<'a> {
    namespace: &'a DirectoryNamespace,
    name: String,
}

impl NameReservation<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &DirectoryNamespace {
        self.namespace
    }

    pub fn target_path(&self) -> PathBuf {
        self.namespace.path_of(&self.name)
    }
}

impl Drop for NameReservation<'_> {
    fn drop(&mut self) {
        self.namespace.release(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::infrastructure::random_identifier_resolver::RandomIdentifierResolver;
    use crate::naming::infrastructure::sequential_suffix_resolver::SequentialSuffixResolver;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, DirectoryNamespace) {
        let tmp = TempDir::new().unwrap();
        let ns = DirectoryNamespace::open(tmp.path().join("uploads")).unwrap();
        (tmp, ns)
    }

    #[test]
    fn test_open_creates_root_and_partial_dir() {
        let (_tmp, ns) = open_temp();
        assert!(ns.root().is_dir());
        assert!(ns.partial_dir().is_dir());
        assert!(ns.partial_dir().starts_with(ns.root()));
    }

    #[test]
    fn test_open_under_a_file_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"not a dir").unwrap();
        let result = DirectoryNamespace::open(blocker.join("uploads"));
        assert!(matches!(result, Err(StorageError::Prepare { .. })));
    }

    #[test]
    fn test_held_reservation_blocks_the_name() {
        let (_tmp, ns) = open_temp();
        let resolver = SequentialSuffixResolver::new();
        let first = ns.reserve("clip.mp4", &resolver);
        let second = ns.reserve("clip.mp4", &resolver);
        assert_eq!(first.name(), "clip.mp4");
        assert_eq!(second.name(), "clip_1.mp4");
    }

    #[test]
    fn test_dropped_reservation_frees_the_name() {
        let (_tmp, ns) = open_temp();
        let resolver = SequentialSuffixResolver::new();
        drop(ns.reserve("clip.mp4", &resolver));
        let again = ns.reserve("clip.mp4", &resolver);
        assert_eq!(again.name(), "clip.mp4");
    }

    #[test]
    fn test_existing_file_blocks_the_name() {
        let (_tmp, ns) = open_temp();
        fs::write(ns.path_of("clip.mp4"), b"existing").unwrap();
        let reservation = ns.reserve("clip.mp4", &SequentialSuffixResolver::new());
        assert_eq!(reservation.name(), "clip_1.mp4");
        assert_eq!(reservation.target_path(), ns.root().join("clip_1.mp4"));
    }

    #[test]
    fn test_partial_dir_name_is_never_handed_out() {
        let (_tmp, ns) = open_temp();
        let reservation = ns.reserve(PARTIAL_DIR_NAME, &SequentialSuffixResolver::new());
        assert_eq!(reservation.name(), format!("{PARTIAL_DIR_NAME}_1"));
    }

    #[test]
    fn test_reservations_compare_names_exactly() {
        let (_tmp, ns) = open_temp();
        let resolver = SequentialSuffixResolver::new();
        let upper = ns.reserve("Clip.mp4", &resolver);
        let lower = ns.reserve("clip.mp4", &resolver);
        assert_eq!(upper.name(), "Clip.mp4");
        assert_eq!(lower.name(), "clip.mp4");
    }

    #[test]
    fn test_random_reservations_differ() {
        let (_tmp, ns) = open_temp();
        let resolver = RandomIdentifierResolver::new();
        let a = ns.reserve("a.mov", &resolver);
        let b = ns.reserve("a.mov", &resolver);
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn test_stored_names_lists_committed_files_only() {
        let (_tmp, ns) = open_temp();
        fs::write(ns.path_of("b.mp4"), b"b").unwrap();
        fs::write(ns.path_of("a.mp4"), b"a").unwrap();
        fs::write(ns.partial_dir().join("upload-x.part"), b"partial").unwrap();
        let _pending = ns.reserve("c.mp4", &SequentialSuffixResolver::new());

        assert_eq!(ns.stored_names().unwrap(), vec!["a.mp4", "b.mp4"]);
        assert!(ns.contains("a.mp4"));
        assert!(!ns.contains("c.mp4"));
        assert!(!ns.contains(PARTIAL_DIR_NAME));
    }

    #[test]
    fn test_concurrent_reservations_are_unique() {
        let (_tmp, ns) = open_temp();
        let resolver = SequentialSuffixResolver::new();
        let (ns, resolver) = (&ns, &resolver);
        let reservations: Vec<NameReservation<'_>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(move || ns.reserve("clip.mp4", resolver)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let names: Vec<&str> = reservations.iter().map(|r| r.name()).collect();

        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
