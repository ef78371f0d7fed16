pub mod callable;

pub use callable::{CallableRequest, CallableResponse, GenerateTemplateRequest, ReviseTextRequest};
