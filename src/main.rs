//! WeatherPro bot CLI.
//!
//! One-shot weather queries through the full pipeline: per-user
//! throttle → TTL cache → OpenWeather client → formatter. The chat
//! front-end drives the same crates through the same entry points.

mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use common::Error;
use weather_core::{
    format, validate, CooldownGate, Decision, Metrics, SlidingWindow, WeatherService,
};

/// WeatherPro — cache-backed OpenWeather front-end
#[derive(Parser)]
#[command(name = "weatherpro-bot", about = "Cache-backed OpenWeather query tool")]
struct Cli {
    /// Validate configuration and exit.
    #[arg(long)]
    check_config: bool,

    /// Drop cached entries for the queried city before fetching.
    #[arg(long)]
    refresh: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Current weather for a city.
    Current { city: String },
    /// Current weather for a coordinate pair.
    Coords { lat: f64, lon: f64 },
    /// 5-day forecast for a city.
    Forecast { city: String },
}

/// Identity used for the CLI's own throttle bookkeeping.
const CLI_USER: u64 = 0;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "weatherpro_bot=info,weather_core=info,openweather_client=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.check_config {
        info!("Configuration OK");
        info!(
            "Upstream: {} (timeout {}s, {} attempts, {} req/min)",
            cfg.api_base_url,
            cfg.request_timeout_secs,
            cfg.max_retries,
            cfg.upstream_requests_per_minute,
        );
        info!(
            "Cache TTLs: current {}s, forecast {}s",
            cfg.current_weather_ttl_secs, cfg.forecast_ttl_secs,
        );
        info!(
            "Throttle: cooldown {}s, window {}/{}s",
            cfg.rate_limit_secs, cfg.max_requests_per_window, cfg.rate_limit_window_secs,
        );
        return;
    }

    let Some(command) = cli.command else {
        error!("No command given; try `current <city>`, `coords <lat> <lon>`, or `forecast <city>`");
        std::process::exit(2);
    };

    let metrics = Arc::new(Metrics::new());
    let service = WeatherService::new(&cfg, Arc::clone(&metrics));
    let cooldown = CooldownGate::new(cfg.rate_limit_secs);
    let window = SlidingWindow::new(cfg.max_requests_per_window, cfg.rate_limit_window_secs);

    // Same admission order the chat layer uses: cooldown, then window.
    if !cooldown.check(CLI_USER) {
        metrics.record_throttled();
        println!("Please wait a moment before the next request.");
        return;
    }
    match window.check(CLI_USER) {
        Decision::Admitted => {}
        Decision::Denied { wait_secs } => {
            metrics.record_throttled();
            println!("Too many requests; retry in {wait_secs}s.");
            return;
        }
    }

    let result = match command {
        Command::Current { city } => {
            let Some(city) = validate::sanitize_city(&city) else {
                println!("That doesn't look like a city name.");
                return;
            };
            if cli.refresh {
                service.invalidate_city(&city);
            }
            let before = metrics.snapshot();
            match service.current_by_name(&city).await {
                Ok(record) => {
                    let from_cache = metrics.snapshot().cache_hits > before.cache_hits;
                    println!("{}", format::format_current(&record, from_cache));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Command::Coords { lat, lon } => {
            if !validate::valid_coords(lat, lon) {
                println!("Coordinates out of range.");
                return;
            }
            let before = metrics.snapshot();
            match service.current_by_coords(lat, lon).await {
                Ok(record) => {
                    let from_cache = metrics.snapshot().cache_hits > before.cache_hits;
                    println!("{}", format::format_current(&record, from_cache));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Command::Forecast { city } => {
            let Some(city) = validate::sanitize_city(&city) else {
                println!("That doesn't look like a city name.");
                return;
            };
            if cli.refresh {
                service.invalidate_city(&city);
            }
            match service.forecast_by_name(&city).await {
                Ok(days) if days.is_empty() => {
                    println!("No forecast available for {city}.");
                    Ok(())
                }
                Ok(days) => {
                    println!("{}", format::format_forecast(&city, &days));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        match &e {
            Error::NotFound(location) => println!("Location not recognized: {location}"),
            Error::Timeout { .. } | Error::Upstream { .. } => {
                warn!("upstream failure: {}", e);
                println!("Weather service is temporarily unavailable, try again later.");
            }
            Error::Config(_) => error!("unexpected error: {}", e),
        }
    }

    let snapshot = metrics.snapshot();
    info!(
        "requests={} cache_hits={} cache_misses={} upstream_failures={} throttled={}",
        snapshot.requests,
        snapshot.cache_hits,
        snapshot.cache_misses,
        snapshot.upstream_failures,
        snapshot.throttled,
    );
}
