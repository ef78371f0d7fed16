//! genai-gateway: callable endpoints relaying prompts to the Gemini API.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
