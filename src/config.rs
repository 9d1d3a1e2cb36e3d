use std::net::IpAddr;
use std::path::PathBuf;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("ROOMS_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid ROOMS_HOST: {e}"))?;

        let port: u16 = env_or("ROOMS_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid ROOMS_PORT: {e}"))?;

        let access_token_ttl = parse_duration(&env_or("JWT_ACCESS_TOKEN_EXPIRES", "30m"))
            .map_err(|e| format!("Invalid JWT_ACCESS_TOKEN_EXPIRES: {e}"))?;

        let refresh_token_ttl = parse_duration(&env_or("JWT_REFRESH_TOKEN_EXPIRES", "7d"))
            .map_err(|e| format!("Invalid JWT_REFRESH_TOKEN_EXPIRES: {e}"))?;

        let upload_dir = PathBuf::from(env_or("ROOMS_UPLOAD_DIR", "uploads"));

        let max_upload_size: usize = env_or("ROOMS_MAX_UPLOAD_SIZE", "3145728")
            .parse()
            .map_err(|e| format!("Invalid ROOMS_MAX_UPLOAD_SIZE: {e}"))?;

        let log_level = env_or("ROOMS_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            access_token_ttl,
            refresh_token_ttl,
            upload_dir,
            max_upload_size,
            log_level,
        })
    }
}

/// Parse an expiry such as `30m`, `7d`, `12h`, `45s` or a bare number of seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("'{value}' does not start with a number"))?;

    match unit {
        "" | "s" => Ok(Duration::seconds(amount)),
        "m" => Ok(Duration::minutes(amount)),
        "h" => Ok(Duration::hours(amount)),
        "d" => Ok(Duration::days(amount)),
        other => Err(format!("unknown unit '{other}' in '{value}'")),
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
