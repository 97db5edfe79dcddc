use std::env;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS for browser clients served from elsewhere.
    pub frontend_url: String,
    /// Directory holding `html/index.html` and `js/script.js`.
    pub asset_dir: PathBuf,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for /api/v1 endpoints
    pub api_per_second: u32,
    /// Burst size for /api/v1 endpoints
    pub api_burst: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Upper bound on the number of yearly events in one generated calendar.
    pub max_years: u32,
    /// PRODID written into generated .ics files.
    pub prodid: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let max_years: u32 = env::var("CALENDAR_MAX_YEARS")
            .unwrap_or_else(|_| "200".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CALENDAR_MAX_YEARS".to_string()))?;
        if max_years == 0 {
            return Err(ConfigError::InvalidValue("CALENDAR_MAX_YEARS".to_string()));
        }

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                asset_dir: env::var("ASSET_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("assets")),
                request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10u64),
            },
            rate_limit: RateLimitConfig {
                api_per_second: env::var("RATE_LIMIT_API_PER_SECOND")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
                api_burst: env::var("RATE_LIMIT_API_BURST")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .unwrap_or(20),
            },
            calendar: CalendarConfig {
                max_years,
                prodid: env::var("CALENDAR_PRODID")
                    .unwrap_or_else(|_| default_prodid()),
            },
        })
    }
}

fn default_prodid() -> String {
    format!("-//lunar-solar-calendar//{}//EN", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                frontend_url: "http://localhost:8080".to_string(),
                asset_dir: PathBuf::from("assets"),
                request_timeout_seconds: 10,
            },
            rate_limit: RateLimitConfig {
                api_per_second: 5,
                api_burst: 20,
            },
            calendar: CalendarConfig {
                max_years: 200,
                prodid: default_prodid(),
            },
        }
    }
}
