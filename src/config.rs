// src/config.rs

use dotenvy::dotenv;
use std::env;

use crate::scoring::DEFAULT_SIMILARITY_THRESHOLD;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,

    /// Minimum fuzzy-match score (0-100) for a completion answer to count
    /// as correct.
    pub similarity_threshold: f64,

    /// International prefix substituted for the national trunk "0".
    pub phone_country_code: String,

    /// Message gateway settings; any missing -> messages are logged only.
    pub dispatch_api_url: Option<String>,
    pub dispatch_api_key: Option<String>,
    pub dispatch_instance: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let similarity_threshold = env::var("SIMILARITY_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);

        let phone_country_code =
            env::var("PHONE_COUNTRY_CODE").unwrap_or_else(|_| "20".to_string());

        Self {
            database_url,
            rust_log,
            similarity_threshold,
            phone_country_code,
            dispatch_api_url: env::var("DISPATCH_API_URL").ok(),
            dispatch_api_key: env::var("DISPATCH_API_KEY").ok(),
            dispatch_instance: env::var("DISPATCH_INSTANCE").ok(),
        }
    }
}
