//! Service Configuration
//! Mission: Collect runtime settings from flags, environment and `.env`

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted access-token cap (one week)
pub const MAX_ACCESS_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted refresh-token lifetime (ten years)
pub const MAX_REFRESH_TTL_HOURS: i64 = 10 * 365 * 24;

#[derive(Parser, Debug, Clone)]
#[command(name = "chirpy")]
#[command(about = "Chirpy - a small message board backend")]
pub struct Config {
    /// Path of the JSON document store
    #[arg(long, env = "CHIRPY_DB_PATH", default_value = "database.json")]
    pub db_path: PathBuf,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// HMAC secret for access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Shared key the payment provider sends on webhooks
    #[arg(long, env = "POLKA_KEY", hide_env_values = true)]
    pub polka_key: String,

    /// Directory served under /app
    #[arg(long, env = "CHIRPY_STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// Longest access-token lifetime in seconds
    #[arg(long, env = "CHIRPY_ACCESS_TTL_SECS", default_value = "3600")]
    pub access_ttl_secs: u64,

    /// Refresh-token lifetime in hours
    #[arg(long, env = "CHIRPY_REFRESH_TTL_HOURS", default_value = "24")]
    pub refresh_ttl_hours: i64,

    /// Delete the database file at start-up
    #[arg(long, env = "CHIRPY_DEBUG")]
    pub debug: bool,
}

impl Config {
    /// Reject settings that would leave the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.polka_key.trim().is_empty() {
            bail!("POLKA_KEY must not be empty");
        }
        if self.access_ttl_secs == 0 || self.access_ttl_secs > MAX_ACCESS_TTL_SECS {
            bail!(
                "access token lifetime must be between 1 and {} seconds",
                MAX_ACCESS_TTL_SECS
            );
        }
        if self.refresh_ttl_hours <= 0 || self.refresh_ttl_hours > MAX_REFRESH_TTL_HOURS {
            bail!(
                "refresh token lifetime must be between 1 and {} hours",
                MAX_REFRESH_TTL_HOURS
            );
        }
        Ok(())
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_hours(self.refresh_ttl_hours).ok_or_else(|| {
            anyhow!(
                "refresh token lifetime of {}h is out of range",
                self.refresh_ttl_hours
            )
        })
    }
}

/// Load `.env` from the working directory tree, then from the crate root.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
