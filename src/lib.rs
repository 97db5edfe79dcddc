//! Lunar/solar birthday conversions and lunar birthday calendars, served
//! over HTTP to a small browser front end, plus a typed client for the same
//! API.

pub mod client;
pub mod config;
pub mod error;
pub mod ical;
pub mod lunar;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;

pub struct AppState {
    pub config: Config,
}
