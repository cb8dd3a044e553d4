pub mod directory_namespace;
pub mod storage_error;
pub mod storage_writer;
