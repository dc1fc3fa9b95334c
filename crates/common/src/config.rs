//! Bot configuration types.

use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// OpenWeather API key.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the OpenWeather REST API.
    #[serde(default = "default_base_url")]
    pub api_base_url: String,

    /// Language code sent as the `lang` query parameter.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Per-attempt HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Total attempts per upstream call (1-10).
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// TTL for cached current-weather records (seconds, min 60).
    #[serde(default = "default_current_ttl")]
    pub current_weather_ttl_secs: u64,

    /// TTL for cached forecasts (seconds, min 60).
    #[serde(default = "default_forecast_ttl")]
    pub forecast_ttl_secs: u64,

    /// Cooldown gate: minimum seconds between requests per user (0.1-60).
    #[serde(default = "default_rate_limit")]
    pub rate_limit_secs: f64,

    /// Sliding window: max requests per user per window.
    #[serde(default = "default_max_requests")]
    pub max_requests_per_window: u32,

    /// Sliding window length in seconds.
    #[serde(default = "default_window")]
    pub rate_limit_window_secs: u64,

    /// Outbound budget towards OpenWeather (requests per minute).
    #[serde(default = "default_upstream_rpm")]
    pub upstream_requests_per_minute: u32,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_current_ttl() -> u64 {
    3600
}

fn default_forecast_ttl() -> u64 {
    7200
}

fn default_rate_limit() -> f64 {
    1.0
}

fn default_max_requests() -> u32 {
    10
}

fn default_window() -> u64 {
    60
}

fn default_upstream_rpm() -> u32 {
    50
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_base_url(),
            lang: default_lang(),
            request_timeout_secs: default_timeout(),
            max_retries: default_retries(),
            current_weather_ttl_secs: default_current_ttl(),
            forecast_ttl_secs: default_forecast_ttl(),
            rate_limit_secs: default_rate_limit(),
            max_requests_per_window: default_max_requests(),
            rate_limit_window_secs: default_window(),
            upstream_requests_per_minute: default_upstream_rpm(),
        }
    }
}
