//! Normalized weather domain types.
//!
//! These are the provider-agnostic shapes the service hands to callers
//! and writes to the cache. Numeric fields are rounded and clamped
//! during normalization; raw provider payloads live in the client crate
//! and never cross this boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A normalized current-weather snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    /// ISO 3166 country code as reported by the provider.
    pub country_code: String,
    /// Rounded to the nearest degree.
    pub temperature_c: i32,
    pub feels_like_c: i32,
    /// Capitalized provider description, e.g. "Clear sky".
    pub description: String,
    /// 0..=100.
    pub humidity_pct: u8,
    pub pressure_hpa: i32,
    pub wind_speed_ms: f64,
    /// 0..=100.
    pub clouds_pct: u8,
    /// Provider icon code, passed through verbatim (e.g. "01d").
    /// Unknown codes fall back to a default symbol at display time.
    pub icon: String,
}

/// One day of a 5-day forecast, reduced to the noon sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub temperature_min_c: i32,
    pub temperature_max_c: i32,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub icon: String,
}
