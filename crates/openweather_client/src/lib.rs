//! OpenWeather API client.
//!
//! Fetches current conditions and 5-day forecast data from the
//! OpenWeather REST API, with bounded retry on transport failures and
//! typed classification of everything else.

pub mod rate_limit;

use common::{BotConfig, Error};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::rate_limit::RateLimiter;

// ── OpenWeather response types ────────────────────────────────────────

/// Response from `GET /weather`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    pub name: String,
    #[serde(default)]
    pub sys: SysInfo,
    pub main: MainInfo,
    #[serde(default)]
    pub weather: Vec<ConditionInfo>,
    #[serde(default)]
    pub wind: WindInfo,
    #[serde(default)]
    pub clouds: CloudsInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SysInfo {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainInfo {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: i32,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindInfo {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudsInfo {
    #[serde(default)]
    pub all: u8,
}

/// Response from `GET /forecast` (3-hour samples, up to 5 days).
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastSlot>,
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSlot {
    /// Sample time as "YYYY-MM-DD HH:MM:SS", provider-local.
    pub dt_txt: String,
    pub main: MainInfo,
    #[serde(default)]
    pub weather: Vec<ConditionInfo>,
    #[serde(default)]
    pub wind: WindInfo,
}

// ── Client ────────────────────────────────────────────────────────────

/// Async client for the OpenWeather REST API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    lang: String,
    max_retries: u32,
    limiter: RateLimiter,
}

impl OpenWeatherClient {
    /// Create a client from the bot configuration.
    pub fn new(config: &BotConfig) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to build OpenWeather HTTP client");

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            lang: config.lang.clone(),
            max_retries: config.max_retries.max(1),
            limiter: RateLimiter::with_limit(config.upstream_requests_per_minute),
        }
    }

    /// Current conditions for a city name.
    pub async fn current_by_name(&self, city: &str) -> Result<CurrentResponse, Error> {
        let params = [("q".to_string(), city.to_string())];
        self.request("weather", &params, city).await
    }

    /// Current conditions for a coordinate pair.
    pub async fn current_by_coords(&self, lat: f64, lon: f64) -> Result<CurrentResponse, Error> {
        let location = format!("{lat:.2},{lon:.2}");
        let params = [
            ("lat".to_string(), lat.to_string()),
            ("lon".to_string(), lon.to_string()),
        ];
        self.request("weather", &params, &location).await
    }

    /// 5-day / 3-hour forecast for a city name.
    pub async fn forecast_by_name(&self, city: &str) -> Result<ForecastResponse, Error> {
        let params = [("q".to_string(), city.to_string())];
        self.request("forecast", &params, city).await
    }

    /// Perform one upstream call with the retry protocol.
    ///
    /// Transport failures are retried immediately up to `max_retries`
    /// attempts total; 404 and other non-2xx statuses are permanent and
    /// returned on the first occurrence.
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        location: &str,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url, endpoint);

        for attempt in 1..=self.max_retries {
            self.limiter.acquire().await;

            debug!(
                "GET {} for {:?} (attempt {}/{})",
                url, location, attempt, self.max_retries
            );

            let sent = self
                .client
                .get(&url)
                .query(params)
                .query(&[
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                    ("lang", self.lang.as_str()),
                ])
                .send()
                .await;

            let resp = match sent {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(
                        "attempt {}/{} failed for {:?}: {}",
                        attempt, self.max_retries, location, e
                    );
                    continue;
                }
            };

            let status = resp.status();
            if status.as_u16() == 404 {
                return Err(Error::NotFound(location.to_string()));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Upstream {
                    status: status.as_u16(),
                    message: body.chars().take(500).collect(),
                });
            }

            return resp.json::<T>().await.map_err(|e| Error::Upstream {
                status: status.as_u16(),
                message: format!("undecodable payload: {e}"),
            });
        }

        Err(Error::Timeout {
            attempts: self.max_retries,
        })
    }
}
