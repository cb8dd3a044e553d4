pub mod command_transcriber;
pub mod placeholder_transcriber;
