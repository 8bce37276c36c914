use std::env;

use anyhow::Context;

use crate::events::DEFAULT_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(AppEnv::Development),
            "prod" | "production" => Ok(AppEnv::Production),
            other => anyhow::bail!("unknown APP_ENV `{other}`"),
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            AppEnv::Development => "info,storefront_api=debug",
            AppEnv::Production => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub env: AppEnv,
    pub jwt_secret: String,
    pub event_channel_capacity: usize,
    pub default_from_email: String,
    pub order_notify_email: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("APP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let env = match lookup("APP_ENV") {
            Some(value) => AppEnv::parse(&value)?,
            None => AppEnv::Development,
        };
        let event_channel_capacity = lookup("EVENT_CHANNEL_CAPACITY")
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let default_from_email = lookup("DEFAULT_FROM_EMAIL")
            .unwrap_or_else(|| "noreply@storefront.local".to_string());
        let order_notify_email = lookup("ORDER_NOTIFY_EMAIL").filter(|e| !e.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            env,
            jwt_secret,
            event_channel_capacity,
            default_from_email,
            order_notify_email,
        })
    }
}
