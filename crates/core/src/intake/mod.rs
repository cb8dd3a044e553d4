pub mod intake_error;
pub mod intake_response;
pub mod intake_use_case;
pub mod upload_request;
