use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    /// Capacity fallback when a candidate slot matches no existing
    /// lesson.
    pub default_max_capacity: u32,
    pub suggestion_step_minutes: u32,
    pub suggestion_window_slots: u32,
    pub suggestion_limit: usize,
    pub calendar_name: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(Environment::with_prefix("APP"))
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("default_max_capacity", 12)?
            .set_default("suggestion_step_minutes", 30)?
            .set_default("suggestion_window_slots", 4)?
            .set_default("suggestion_limit", 3)?
            .build()?;

        config.try_deserialize()
    }
}
