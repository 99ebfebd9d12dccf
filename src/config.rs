use anyhow::{Context, Result};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub banks_dir: Option<String>,
    pub app_url: String,
    pub email: Option<EmailConfig>,
    pub rate_limit_max: usize,
    pub rate_limit_window_secs: u64,
    pub trust_proxy: bool,
    pub reset_token_ttl_minutes: i64,
}

fn required(key: &str) -> Result<String> {
    dotenv::var(key).with_context(|| format!("environment variable {} not been set", key))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(key) {
        Ok(v) => v.parse().with_context(|| format!("invalid value for {}: {}", key, v)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let email = match dotenv::var("EMAIL_USER") {
            Ok(user) => Some(EmailConfig {
                host: or_default("EMAIL_HOST", "smtp.gmail.com".to_owned())?,
                password: required("EMAIL_PASSWORD")?,
                from: or_default("EMAIL_FROM", user.clone())?,
                user,
            }),
            Err(_) => None,
        };
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: or_default("DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:8000".to_owned())?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_days: or_default("JWT_TTL_DAYS", 30)?,
            bcrypt_cost: or_default("BCRYPT_COST", 10)?,
            banks_dir: dotenv::var("BANKS_DIR").ok(),
            app_url: or_default("APP_URL", "http://localhost:3000".to_owned())?,
            email,
            rate_limit_max: or_default("RATE_LIMIT_MAX", 10)?,
            rate_limit_window_secs: or_default("RATE_LIMIT_WINDOW_SECS", 60)?,
            trust_proxy: or_default("TRUST_PROXY", false)?,
            reset_token_ttl_minutes: or_default("RESET_TOKEN_TTL_MINUTES", 60)?,
        })
    }
}
