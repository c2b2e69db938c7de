use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Which key-value backend holds the links document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Spanner,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spanner" => Ok(StorageBackend::Spanner),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE_BACKEND must be one of: spanner, memory, got '{}'", other),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Spanner => f.write_str("spanner"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Connection settings for the Spanner backend
#[derive(Debug, Clone)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_secret: Option<String>,
    pub storage_backend: StorageBackend,
    pub spanner: Option<SpannerConfig>,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty secret is treated the same as an unset one.
        let webhook_secret = lookup("WEBHOOK_SECRET").filter(|s| !s.is_empty());

        let storage_backend = lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "spanner".to_string())
            .parse::<StorageBackend>()?;

        let spanner = match storage_backend {
            StorageBackend::Spanner => {
                let emulator_host = lookup("SPANNER_EMULATOR_HOST");

                let project = lookup("SPANNER_PROJECT")
                    .context("SPANNER_PROJECT environment variable is required")?;

                let instance = lookup("SPANNER_INSTANCE")
                    .context("SPANNER_INSTANCE environment variable is required")?;

                let database = lookup("SPANNER_DATABASE")
                    .context("SPANNER_DATABASE environment variable is required")?;

                Some(SpannerConfig {
                    emulator_host,
                    project,
                    instance,
                    database,
                })
            }
            StorageBackend::Memory => None,
        };

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            webhook_secret,
            storage_backend,
            spanner,
            service_port,
            service_host,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Storage backend: {}", self.storage_backend);
        if let Some(spanner) = &self.spanner {
            tracing::info!("  Spanner emulator: {}",
                spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
            tracing::info!("  Spanner project: {}", spanner.project);
            tracing::info!("  Spanner instance: {}", spanner.instance);
            tracing::info!("  Spanner database: {}", spanner.database);
        }
        if self.webhook_secret.is_some() {
            tracing::info!("  Webhook secret: set");
        } else {
            tracing::warn!("  Webhook secret: NOT SET (webhook requests will fail with 500)");
        }
        tracing::info!("  Service listening on: {}", self.address());
    }
}
