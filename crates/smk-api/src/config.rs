use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

/// Deployment environment, read from `ENV`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Server configuration, one field per environment variable
/// (`database_url` is read from `DATABASE_URL` and so on).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    /// Comma separated list of origins allowed by CORS
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_ranking_cache_ttl_secs")]
    pub ranking_cache_ttl_secs: u64,
    /// Drop cached rankings of a materia when one of its quiz results is recorded
    #[serde(default)]
    pub ranking_write_through: bool,
    /// Concurrent learning-state reads per progress computation
    #[serde(default = "default_progress_batch_size")]
    pub progress_batch_size: usize,
    /// Offset of the local calendar day from UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

const fn default_port() -> u16 {
    3000
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_ranking_cache_ttl_secs() -> u64 {
    300
}

const fn default_progress_batch_size() -> usize {
    10
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Offset used to decide which calendar day "today" is.
    ///
    /// Out of range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            tracing::warn!(
                minutes = self.utc_offset_minutes,
                "UTC offset out of range, using UTC"
            );
            Utc.fix()
        })
    }
}
