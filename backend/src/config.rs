use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub mzone: MzoneConfig,
    /// Worker-pool bound for the batch executors. 1 keeps calls strictly sequential.
    pub batch_concurrency: usize,
    /// How long a finished batch job stays pollable.
    pub job_retention: Duration,
}

#[derive(Clone)]
pub struct MzoneConfig {
    pub auth_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub page_size: usize,
    pub page_delay: Duration,
    pub timeout: Duration,
}

impl std::fmt::Debug for MzoneConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MzoneConfig")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("page_size", &self.page_size)
            .field("page_delay", &self.page_delay)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str, default: &str| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let batch_concurrency = parse_number("FLEET_BATCH_CONCURRENCY", &optional("FLEET_BATCH_CONCURRENCY", "1"))?;
        if batch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "FLEET_BATCH_CONCURRENCY",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(AppConfig {
            host: optional("FLEET_HOST", "127.0.0.1"),
            port: parse_number("FLEET_PORT", &optional("FLEET_PORT", "8080"))?,
            database_path: PathBuf::from(optional("FLEET_DATABASE", "fleet.sqlite")),
            upload_dir: PathBuf::from(optional("FLEET_UPLOAD_DIR", "./uploads")),
            mzone: MzoneConfig {
                auth_url: required("MZONE_AUTH_URL")?,
                api_url: required("MZONE_API_URL")?.trim_end_matches('/').to_string(),
                client_id: required("MZONE_CLIENT_ID")?,
                client_secret: required("MZONE_CLIENT_SECRET")?,
                scope: optional("MZONE_SCOPE", "openid mz6-api.all"),
                page_size: parse_number("MZONE_PAGE_SIZE", &optional("MZONE_PAGE_SIZE", "500"))?,
                page_delay: Duration::from_millis(parse_number(
                    "MZONE_PAGE_DELAY_MS",
                    &optional("MZONE_PAGE_DELAY_MS", "300"),
                )?),
                timeout: Duration::from_secs(parse_number(
                    "MZONE_TIMEOUT_SECS",
                    &optional("MZONE_TIMEOUT_SECS", "30"),
                )?),
            },
            batch_concurrency,
            job_retention: Duration::from_secs(parse_number(
                "FLEET_JOB_RETENTION_SECS",
                &optional("FLEET_JOB_RETENTION_SECS", "3600"),
            )?),
        })
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
