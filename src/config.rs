use sqlx::PgPool;
use tracing::{info, warn};

use crate::catalog::PointsPlayedPolicy;
use crate::errors::LedgerError;

pub const DEFAULT_LOG_FILTER: &str = "volleystats=debug";

/// Runtime settings, read from the environment with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Score per point played instead of absolute totals.
    pub include_points_played: bool,
    pub points_played_policy: PointsPlayedPolicy,
    pub log_filter: String,
    /// Only needed by the PostgreSQL repositories.
    pub database_url: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            include_points_played: true,
            points_played_policy: PointsPlayedPolicy::Standard,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            database_url: None,
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let include_points_played = match lookup("VOLLEYSTATS_INCLUDE_POINTS_PLAYED") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid VOLLEYSTATS_INCLUDE_POINTS_PLAYED, using default");
                defaults.include_points_played
            }),
            None => defaults.include_points_played,
        };

        let points_played_policy = match lookup("VOLLEYSTATS_POINTS_PLAYED_POLICY") {
            Some(raw) => PointsPlayedPolicy::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid VOLLEYSTATS_POINTS_PLAYED_POLICY, using default");
                defaults.points_played_policy
            }),
            None => defaults.points_played_policy,
        };

        Self {
            include_points_played,
            points_played_policy,
            log_filter: lookup("VOLLEYSTATS_LOG").unwrap_or(defaults.log_filter),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
        }
    }

    /// Opens the pool backing the PostgreSQL repositories.
    pub async fn connect(&self) -> Result<PgPool, LedgerError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or_else(|| LedgerError::Storage("DATABASE_URL is not set".to_string()))?;
        let pool = PgPool::connect(url).await?;
        info!("Connected to PostgreSQL");
        Ok(pool)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
