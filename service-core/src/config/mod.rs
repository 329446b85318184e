use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Environment variable selecting the optional per-environment overlay file.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Telemetry settings shared by every service.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load settings from `base.yaml`, an optional `{APP_ENVIRONMENT}.yaml`
/// overlay and `APP_`-prefixed environment variables, in that order.
///
/// Nested keys use `__` in environment variables, e.g.
/// `APP_MOVIE_API__BASE_URL`.
pub fn load_layered<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "local".to_string());

    let settings = Cfg::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            File::from(configuration_directory.join(format!("{}.yaml", environment)))
                .required(false),
        )
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
