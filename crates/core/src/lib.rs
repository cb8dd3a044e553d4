//! Durable, collision-free storage of uploaded videos and the hand-off of each
//! stored file to a transcription step.
//!
//! - [`naming`]: picks a stored name that cannot clash with the namespace.
//! - [`storage`]: the directory namespace and the streaming writer.
//! - [`processing`]: the transcriber port and its adapters.
//! - [`intake`]: the use case tying the three together per upload.

pub mod intake;
pub mod naming;
pub mod processing;
pub mod shared;
pub mod storage;
