//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{BotConfig, Error};
use std::path::Path;

fn parse_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

fn parse_u32(raw: &str, env_name: &str) -> Result<u32, Error> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

fn parse_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number > 0")))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &BotConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.api_key.trim().is_empty() {
        issues.push("api_key is required (set OPENWEATHER_API_KEY)".into());
    }
    if config.api_base_url.trim().is_empty() {
        issues.push("api_base_url must not be empty".into());
    }
    if config.request_timeout_secs == 0 {
        issues.push("request_timeout_secs must be > 0".into());
    }
    if !(1..=10).contains(&config.max_retries) {
        issues.push("max_retries must be between 1 and 10".into());
    }
    if config.current_weather_ttl_secs < 60 {
        issues.push("current_weather_ttl_secs must be at least 60".into());
    }
    if config.forecast_ttl_secs < 60 {
        issues.push("forecast_ttl_secs must be at least 60".into());
    }
    if !(0.1..=60.0).contains(&config.rate_limit_secs) {
        issues.push("rate_limit_secs must be between 0.1 and 60".into());
    }
    if config.max_requests_per_window == 0 {
        issues.push("max_requests_per_window must be > 0".into());
    }
    if config.rate_limit_window_secs == 0 {
        issues.push("rate_limit_window_secs must be > 0".into());
    }
    if config.upstream_requests_per_minute == 0 {
        issues.push("upstream_requests_per_minute must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load bot configuration from environment and optional config file.
pub fn load_config() -> Result<BotConfig, Error> {
    // 1. Load .env file from the working directory or its parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = BotConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
        config.api_key = key;
    }
    if let Ok(url) = std::env::var("OPENWEATHER_BASE_URL") {
        config.api_base_url = url;
    }
    if let Ok(raw) = std::env::var("WEATHER_LANG") {
        config.lang = raw.trim().to_string();
    }
    if let Ok(raw) = std::env::var("API_TIMEOUT") {
        config.request_timeout_secs = parse_u64(&raw, "API_TIMEOUT")?;
    }
    if let Ok(raw) = std::env::var("MAX_RETRIES") {
        config.max_retries = parse_u32(&raw, "MAX_RETRIES")?;
    }
    if let Ok(raw) = std::env::var("CACHE_TTL") {
        config.current_weather_ttl_secs = parse_u64(&raw, "CACHE_TTL")?;
    }
    if let Ok(raw) = std::env::var("FORECAST_CACHE_TTL") {
        config.forecast_ttl_secs = parse_u64(&raw, "FORECAST_CACHE_TTL")?;
    }
    if let Ok(raw) = std::env::var("RATE_LIMIT") {
        config.rate_limit_secs = parse_f64(&raw, "RATE_LIMIT")?;
    }
    if let Ok(raw) = std::env::var("MAX_REQUESTS_PER_WINDOW") {
        config.max_requests_per_window = parse_u32(&raw, "MAX_REQUESTS_PER_WINDOW")?;
    }
    if let Ok(raw) = std::env::var("RATE_LIMIT_WINDOW") {
        config.rate_limit_window_secs = parse_u64(&raw, "RATE_LIMIT_WINDOW")?;
    }
    if let Ok(raw) = std::env::var("UPSTREAM_REQUESTS_PER_MINUTE") {
        config.upstream_requests_per_minute = parse_u32(&raw, "UPSTREAM_REQUESTS_PER_MINUTE")?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BotConfig {
        BotConfig {
            api_key: "key".to_string(),
            ..BotConfig::default()
        }
    }

    #[test]
    fn defaults_with_an_api_key_are_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let config = BotConfig::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn ttl_minimums_are_enforced() {
        let mut config = valid_config();
        config.current_weather_ttl_secs = 59;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.forecast_ttl_secs = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn retry_range_is_enforced() {
        let mut config = valid_config();
        config.max_retries = 0;
        assert!(validate_config(&config).is_err());

        config.max_retries = 11;
        assert!(validate_config(&config).is_err());

        config.max_retries = 10;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rate_limit_range_is_enforced() {
        let mut config = valid_config();
        config.rate_limit_secs = 0.05;
        assert!(validate_config(&config).is_err());

        config.rate_limit_secs = 61.0;
        assert!(validate_config(&config).is_err());

        config.rate_limit_secs = 0.1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn all_issues_are_reported_together() {
        let mut config = BotConfig::default();
        config.max_retries = 0;
        config.current_weather_ttl_secs = 1;

        match validate_config(&config) {
            Err(Error::Config(message)) => {
                assert!(message.contains("api_key"));
                assert!(message.contains("max_retries"));
                assert!(message.contains("current_weather_ttl_secs"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
