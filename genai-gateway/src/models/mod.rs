//! Upstream payload model.

pub mod payload;

pub use payload::{Content, GenerateContentRequest, GenerationConfig, Part};
