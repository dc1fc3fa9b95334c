//! Input validation for user-supplied locations.
//!
//! City names may contain letters (any script), spaces, hyphens, and
//! apostrophes. Everything else — digits, markup, control characters —
//! is rejected before it ever reaches a cache key or an upstream query.

const MIN_CITY_LEN: usize = 2;
const MAX_CITY_LEN: usize = 100;

fn is_valid_city(city: &str) -> bool {
    let len = city.chars().count();
    if !(MIN_CITY_LEN..=MAX_CITY_LEN).contains(&len) {
        return false;
    }
    city.chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
}

/// Collapse whitespace, validate, and title-case a city name.
/// Returns `None` for input that cannot be a city name.
pub fn sanitize_city(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !is_valid_city(&collapsed) {
        return None;
    }

    // Title-case each alphabetic run: "saint-petersburg" → "Saint-Petersburg".
    let mut titled = String::with_capacity(collapsed.len());
    let mut boundary = true;
    for c in collapsed.chars() {
        if c.is_alphabetic() {
            if boundary {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            titled.push(c);
            boundary = true;
        }
    }

    Some(titled)
}

/// Latitude/longitude range check.
pub fn valid_coords(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
