//! Read-through weather service.
//!
//! Composes the TTL cache and the OpenWeather client: cache hits never
//! touch the network; misses fetch, normalize, and populate the cache.
//! Concurrent misses for the same key share a single upstream call.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use common::{BotConfig, Error, ForecastDay, WeatherRecord};
use dashmap::DashMap;
use openweather_client::{CurrentResponse, ForecastResponse, OpenWeatherClient};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::metrics::Metrics;

/// Maximum days returned by a forecast query.
const FORECAST_DAYS: usize = 5;

/// The weather service that answers current and forecast queries.
pub struct WeatherService {
    client: OpenWeatherClient,
    cache: TtlCache,
    metrics: Arc<Metrics>,
    current_ttl_secs: u64,
    forecast_ttl_secs: u64,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl WeatherService {
    pub fn new(config: &BotConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            client: OpenWeatherClient::new(config),
            cache: TtlCache::new(),
            metrics,
            current_ttl_secs: config.current_weather_ttl_secs,
            forecast_ttl_secs: config.forecast_ttl_secs,
            in_flight: DashMap::new(),
        }
    }

    /// Current weather for a city name.
    pub async fn current_by_name(&self, city: &str) -> Result<WeatherRecord, Error> {
        self.metrics.record_request();
        let key = TtlCache::key_for("weather", &[city]);
        let fetch = async {
            let raw = self.client.current_by_name(city).await?;
            Ok(normalize_current(raw))
        };
        self.read_through(&key, self.current_ttl_secs, fetch).await
    }

    /// Current weather for a coordinate pair.
    ///
    /// Coordinates are rounded to two decimals before key construction,
    /// so nearby lookups (within ~1km) share one cache entry.
    pub async fn current_by_coords(&self, lat: f64, lon: f64) -> Result<WeatherRecord, Error> {
        self.metrics.record_request();
        let key = TtlCache::key_for(
            "weather_coords",
            &[&format!("{lat:.2}"), &format!("{lon:.2}")],
        );
        let fetch = async {
            let raw = self.client.current_by_coords(lat, lon).await?;
            Ok(normalize_current(raw))
        };
        self.read_through(&key, self.current_ttl_secs, fetch).await
    }

    /// 5-day forecast for a city name. An empty result means the
    /// provider had no usable samples — presentation is the caller's
    /// call, not an error here.
    pub async fn forecast_by_name(&self, city: &str) -> Result<Vec<ForecastDay>, Error> {
        self.metrics.record_request();
        let key = TtlCache::key_for("forecast", &[city]);
        let fetch = async {
            let raw = self.client.forecast_by_name(city).await?;
            Ok(normalize_forecast(raw))
        };
        self.read_through(&key, self.forecast_ttl_secs, fetch).await
    }

    /// Drop every cached form for a city (current weather and forecast).
    pub fn invalidate_city(&self, city: &str) {
        let city = city.trim().to_lowercase();
        self.cache.invalidate(&format!("weather:{city}"));
        self.cache.invalidate(&format!("forecast:{city}"));
    }

    /// Cache lookup, then a deduplicated fetch on miss.
    ///
    /// The per-key mutex makes concurrent misses for one key wait for
    /// the first fetch; the waiters then hit the freshly written entry
    /// instead of issuing their own upstream calls.
    async fn read_through<T, F>(&self, key: &str, ttl_secs: u64, fetch: F) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, Error>>,
    {
        if let Some(value) = self.cache.get_json::<T>(key) {
            self.metrics.record_cache_hit();
            debug!("cache hit: {}", key);
            return Ok(value);
        }
        self.metrics.record_cache_miss();
        debug!("cache miss: {}", key);

        let gate = {
            let entry = self
                .in_flight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            entry.clone()
        };
        let _held = gate.lock().await;

        // A concurrent miss may have populated the entry while we waited.
        if let Some(value) = self.cache.get_json::<T>(key) {
            self.metrics.record_cache_hit();
            return Ok(value);
        }

        let outcome = match fetch.await {
            Ok(value) => {
                self.cache.set_json(key, &value, ttl_secs);
                Ok(value)
            }
            Err(e) => {
                self.metrics.record_upstream_failure();
                warn!("upstream fetch failed for {}: {}", key, e);
                Err(e)
            }
        };

        self.in_flight.remove(key);
        outcome
    }
}

// ── Normalization ─────────────────────────────────────────────────────

/// First letter upper-cased, the rest lowered ("clear sky" → "Clear sky").
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Flatten a raw current-conditions payload into a normalized record.
fn normalize_current(raw: CurrentResponse) -> WeatherRecord {
    let (description, icon) = raw
        .weather
        .into_iter()
        .next()
        .map(|c| (c.description, c.icon))
        .unwrap_or_default();

    WeatherRecord {
        city: raw.name,
        country_code: raw.sys.country,
        temperature_c: raw.main.temp.round() as i32,
        feels_like_c: raw.main.feels_like.round() as i32,
        description: capitalize(&description),
        humidity_pct: raw.main.humidity.min(100),
        pressure_hpa: raw.main.pressure,
        wind_speed_ms: raw.wind.speed,
        clouds_pct: raw.clouds.all.min(100),
        icon,
    }
}

/// Reduce 3-hour samples to one entry per calendar date — the 12:00
/// sample — at most `FORECAST_DAYS` entries, ascending by date. Days
/// without a noon sample are skipped rather than approximated.
fn normalize_forecast(raw: ForecastResponse) -> Vec<ForecastDay> {
    let mut days: BTreeMap<chrono::NaiveDate, ForecastDay> = BTreeMap::new();

    for slot in raw.list {
        let Ok(stamp) = NaiveDateTime::parse_from_str(&slot.dt_txt, "%Y-%m-%d %H:%M:%S") else {
            warn!("skipping forecast sample with bad timestamp {:?}", slot.dt_txt);
            continue;
        };
        if (stamp.hour(), stamp.minute(), stamp.second()) != (12, 0, 0) {
            continue;
        }
        let date = stamp.date();
        if days.contains_key(&date) {
            continue;
        }

        let (description, icon) = slot
            .weather
            .into_iter()
            .next()
            .map(|c| (c.description, c.icon))
            .unwrap_or_default();

        days.insert(
            date,
            ForecastDay {
                date,
                temperature_c: slot.main.temp.round() as i32,
                temperature_min_c: slot.main.temp_min.round() as i32,
                temperature_max_c: slot.main.temp_max.round() as i32,
                description: capitalize(&description),
                humidity_pct: slot.main.humidity.min(100),
                wind_speed_ms: slot.wind.speed,
                icon,
            },
        );
    }

    days.into_values().take(FORECAST_DAYS).collect()
}
