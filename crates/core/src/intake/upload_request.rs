use std::fmt;
use std::io::Read;

/// One incoming upload: the name the client declared and its byte stream.
pub struct UploadRequest {
    pub declared_filename: String,
    pub byte_stream: Box<dyn Read + Send>,
}

impl UploadRequest {
    pub fn new(declared_filename: impl Into<String>, byte_stream: impl Read + Send + 'static) -> Self {
        Self {
            declared_filename: declared_filename.into(),
            byte_stream: Box::new(byte_stream),
        }
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("declared_filename", &self.declared_filename)
            .finish_non_exhaustive()
    }
}
