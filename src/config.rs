//! Runtime settings read from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_ACCESS_MINUTES: i64 = 5;
const DEFAULT_REFRESH_HOURS: i64 = 24;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub media: MediaSettings,
    pub logging: LoggingSettings,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_minutes: i64,
    pub refresh_hours: i64,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_minutes: DEFAULT_ACCESS_MINUTES,
            refresh_hours: DEFAULT_REFRESH_HOURS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaSettings {
    pub root: PathBuf,
    pub url: String,
    pub max_upload_bytes: usize,
}

impl MediaSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url: "/media/".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            server: ServerSettings {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_or("PORT", 8000)?,
                allowed_origins,
            },
            database: DatabaseSettings {
                url: required("DATABASE_URL")?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            jwt: JwtSettings {
                secret: required("JWT_SECRET")?,
                access_minutes: parse_or("JWT_ACCESS_MINUTES", DEFAULT_ACCESS_MINUTES)?,
                refresh_hours: parse_or("JWT_REFRESH_HOURS", DEFAULT_REFRESH_HOURS)?,
            },
            media: MediaSettings {
                root: PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string())),
                url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
                max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            logging: LoggingSettings {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
