//! Data-access core for the weather bot.
//!
//! Composes the TTL cache, the OpenWeather client, per-user request
//! throttling, and presentation formatting. The chat layer drives it
//! through `WeatherService`, the throttles, and `format` — nothing else
//! crosses the boundary.

pub mod cache;
pub mod format;
pub mod metrics;
pub mod service;
pub mod throttle;
pub mod validate;

pub use cache::TtlCache;
pub use metrics::{Metrics, MetricsSnapshot};
pub use service::WeatherService;
pub use throttle::{CooldownGate, Decision, SlidingWindow};
