pub const DEFAULT_STORAGE_DIR: &str = "uploads";

/// Chunk size used when streaming an upload to disk.
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Hidden directory inside a namespace root that holds in-flight writes.
pub const PARTIAL_DIR_NAME: &str = ".partial";
pub const PARTIAL_FILE_PREFIX: &str = "upload-";
pub const PARTIAL_FILE_SUFFIX: &str = ".part";

/// Separator placed between a base name and its sequence number.
pub const SEQUENCE_SEPARATOR: char = '_';
