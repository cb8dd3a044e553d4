pub mod constants;
pub mod file_name;
pub mod stored_artifact;
