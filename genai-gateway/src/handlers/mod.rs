//! HTTP handlers for genai-gateway.

pub mod callable;
pub mod health;

pub use callable::{generate_template, revise_text};
pub use health::{health_check, metrics, readiness_check};
