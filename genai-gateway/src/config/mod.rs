use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_optional, get_env_parsed};
use service_core::error::AppError;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Largest accepted `prompt`, `systemPrompt` or `textToRevise`, in bytes.
const DEFAULT_MAX_TEXT_BYTES: usize = 100_000;
/// Largest accepted `schema`, measured as serialized JSON.
const DEFAULT_MAX_SCHEMA_BYTES: usize = 32_768;
const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub limits: RequestLimits,
    pub cors: CorsSettings,
    /// OTLP collector for trace export; `None` keeps traces local.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Size bounds applied to every invocation before anything is sent upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_text_bytes: usize,
    pub max_schema_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            max_schema_bytes: DEFAULT_MAX_SCHEMA_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsSettings {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = common.is_production();

        let api_key = get_env("GEMINI_API_KEY", None, is_prod)?;
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_API_KEY is set but empty"
            )));
        }

        Ok(GatewayConfig {
            common,
            gemini: GeminiSettings {
                api_key: Secret::new(api_key),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_API_BASE), is_prod)?
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(get_env_parsed(
                    "GEMINI_TIMEOUT_SECS",
                    DEFAULT_TIMEOUT_SECS,
                    is_prod,
                )?),
            },
            limits: RequestLimits {
                max_text_bytes: get_env_parsed(
                    "GATEWAY_MAX_TEXT_BYTES",
                    DEFAULT_MAX_TEXT_BYTES,
                    is_prod,
                )?,
                max_schema_bytes: get_env_parsed(
                    "GATEWAY_MAX_SCHEMA_BYTES",
                    DEFAULT_MAX_SCHEMA_BYTES,
                    is_prod,
                )?,
                max_body_bytes: get_env_parsed(
                    "GATEWAY_MAX_BODY_BYTES",
                    DEFAULT_MAX_BODY_BYTES,
                    is_prod,
                )?,
            },
            cors: CorsSettings {
                allowed_origins: parse_origins(&get_env(
                    "GATEWAY_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
            },
            otlp_endpoint: get_env_optional("OTLP_ENDPOINT"),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(str::to_string)
        .collect()
}
