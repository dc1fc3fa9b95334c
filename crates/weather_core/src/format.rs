//! Presentation formatting for weather records.
//!
//! Pure functions from normalized records to display text plus the
//! qualitative classifications (temperature band, humidity and wind
//! buckets, advisory tips). Stateless; the chat layer decides where the
//! text goes.

use common::{ForecastDay, WeatherRecord};

/// Display symbol for an OpenWeather icon code. Unknown codes map to a
/// default symbol, never an error.
pub fn icon_symbol(icon: &str) -> &'static str {
    match icon {
        "01d" => "☀️",
        "01n" => "🌙",
        "02d" => "⛅",
        "02n" | "03d" | "03n" | "04d" | "04n" => "☁️",
        "09d" | "09n" | "10n" => "🌧",
        "10d" => "🌦",
        "11d" | "11n" => "⛈",
        "13d" | "13n" => "❄️",
        "50d" | "50n" => "🌫",
        _ => "🌡",
    }
}

/// Temperature-band symbol.
pub fn temperature_symbol(temp_c: i32) -> &'static str {
    match temp_c {
        t if t <= -20 => "🥶",
        t if t <= -10 => "❄️",
        t if t <= 0 => "🧊",
        t if t <= 10 => "🧥",
        t if t <= 20 => "🌡",
        t if t <= 30 => "☀️",
        _ => "🔥",
    }
}

/// Qualitative humidity bucket.
pub fn humidity_label(humidity_pct: u8) -> &'static str {
    match humidity_pct {
        h if h < 30 => "dry",
        h if h < 60 => "comfortable",
        h if h < 80 => "humid",
        _ => "very humid",
    }
}

/// Qualitative wind bucket.
pub fn wind_label(wind_speed_ms: f64) -> &'static str {
    match wind_speed_ms {
        w if w < 2.0 => "calm",
        w if w < 5.0 => "light",
        w if w < 10.0 => "moderate",
        w if w < 15.0 => "strong",
        _ => "very strong",
    }
}

/// Marker comparing felt and measured temperature.
fn comfort_marker(temp_c: i32, feels_like_c: i32) -> &'static str {
    match (temp_c - feels_like_c).abs() {
        d if d <= 2 => "✅",
        d if d <= 5 => "⚠️",
        _ => "❌",
    }
}

/// Advisory tips from fixed threshold rules.
pub fn advisory_tips(record: &WeatherRecord) -> Vec<&'static str> {
    let mut tips = Vec::new();

    if record.temperature_c < 0 {
        tips.push("Dress warmly");
    }
    if record.temperature_c > 30 {
        tips.push("Take water with you");
    }
    if record.wind_speed_ms > 10.0 {
        tips.push("Strong wind, be careful outside");
    }
    if record.humidity_pct > 80 {
        tips.push("High humidity, rain is possible");
    }
    if matches!(record.icon.as_str(), "09d" | "09n" | "10d" | "10n") {
        tips.push("Don't forget an umbrella");
    }

    tips
}

/// Render a current-weather record as display text.
pub fn format_current(record: &WeatherRecord, from_cache: bool) -> String {
    let mut text = format!(
        "{} Weather in {}, {}\n\n\
         {} Temperature: {:+}°C\n\
         Feels like: {:+}°C {}\n\
         {}\n\n\
         Humidity: {}% ({})\n\
         Wind: {} m/s ({})\n\
         Pressure: {} hPa\n\
         Clouds: {}%\n",
        icon_symbol(&record.icon),
        record.city,
        record.country_code,
        temperature_symbol(record.temperature_c),
        record.temperature_c,
        record.feels_like_c,
        comfort_marker(record.temperature_c, record.feels_like_c),
        record.description,
        record.humidity_pct,
        humidity_label(record.humidity_pct),
        record.wind_speed_ms,
        wind_label(record.wind_speed_ms),
        record.pressure_hpa,
        record.clouds_pct,
    );

    let tips = advisory_tips(record);
    if !tips.is_empty() {
        text.push_str("\nTip: ");
        text.push_str(&tips.join(". "));
        text.push('\n');
    }

    if from_cache {
        text.push_str("\n(cached)\n");
    }

    text
}

/// Render a forecast as display text, one block per day.
pub fn format_forecast(city: &str, days: &[ForecastDay]) -> String {
    let mut text = format!("5-day forecast for {city}\n\n");

    for day in days {
        text.push_str(&format!(
            "{} {}, {}\n  {} {:+}°C (low {:+}°, high {:+}°)\n  {}\n  Humidity {}% | Wind {} m/s\n\n",
            icon_symbol(&day.icon),
            day.date.format("%A"),
            day.date.format("%d.%m"),
            temperature_symbol(day.temperature_c),
            day.temperature_c,
            day.temperature_min_c,
            day.temperature_max_c,
            day.description,
            day.humidity_pct,
            day.wind_speed_ms,
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> WeatherRecord {
        WeatherRecord {
            city: "Moscow".to_string(),
            country_code: "RU".to_string(),
            temperature_c: 21,
            feels_like_c: 19,
            description: "Clear sky".to_string(),
            humidity_pct: 65,
            pressure_hpa: 1013,
            wind_speed_ms: 3.5,
            clouds_pct: 10,
            icon: "01d".to_string(),
        }
    }

    #[test]
    fn unknown_icon_gets_the_default_symbol() {
        assert_eq!(icon_symbol("99x"), "🌡");
        assert_eq!(icon_symbol(""), "🌡");
    }

    #[test]
    fn known_icons_map_to_their_symbols() {
        assert_eq!(icon_symbol("01d"), "☀️");
        assert_eq!(icon_symbol("13n"), "❄️");
        assert_eq!(icon_symbol("50d"), "🌫");
    }

    #[test]
    fn temperature_bands_cover_the_scale() {
        assert_eq!(temperature_symbol(-25), "🥶");
        assert_eq!(temperature_symbol(-15), "❄️");
        assert_eq!(temperature_symbol(0), "🧊");
        assert_eq!(temperature_symbol(15), "🌡");
        assert_eq!(temperature_symbol(35), "🔥");
    }

    #[test]
    fn no_tips_for_mild_weather() {
        assert!(advisory_tips(&record()).is_empty());
    }

    #[test]
    fn tips_fire_on_their_thresholds() {
        let mut extreme = record();
        extreme.temperature_c = -5;
        extreme.wind_speed_ms = 12.0;
        extreme.humidity_pct = 85;
        extreme.icon = "10d".to_string();

        let tips = advisory_tips(&extreme);
        assert_eq!(tips.len(), 4);
        assert!(tips.contains(&"Dress warmly"));
        assert!(tips.contains(&"Don't forget an umbrella"));
    }

    #[test]
    fn boundary_values_do_not_trigger_tips() {
        let mut boundary = record();
        boundary.temperature_c = 0;
        boundary.wind_speed_ms = 10.0;
        boundary.humidity_pct = 80;

        assert!(advisory_tips(&boundary).is_empty());
    }

    #[test]
    fn current_text_carries_the_record_fields() {
        let text = format_current(&record(), false);

        assert!(text.contains("Weather in Moscow, RU"));
        assert!(text.contains("+21°C"));
        assert!(text.contains("Clear sky"));
        assert!(!text.contains("(cached)"));
    }

    #[test]
    fn cached_results_are_marked() {
        let text = format_current(&record(), true);
        assert!(text.contains("(cached)"));
    }

    #[test]
    fn forecast_text_lists_each_day() {
        let days = vec![ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            temperature_c: 21,
            temperature_min_c: 17,
            temperature_max_c: 23,
            description: "Scattered clouds".to_string(),
            humidity_pct: 60,
            wind_speed_ms: 2.5,
            icon: "03d".to_string(),
        }];

        let text = format_forecast("Paris", &days);
        assert!(text.contains("5-day forecast for Paris"));
        assert!(text.contains("Friday"));
        assert!(text.contains("07.08"));
        assert!(text.contains("Scattered clouds"));
    }
}
