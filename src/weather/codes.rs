//! Weather code table (WMO codes as reported by Open-Meteo)

/// Condition text for climate-tier days, which carry no weather code
pub const CLIMATE_PLACEHOLDER: &str = "long-term trend only (no weather code)";

/// Convert a weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: i64) -> String {
    let description = match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "moderate drizzle",
        55 => "dense drizzle",
        61 => "slight rain",
        63 => "moderate rain",
        65 => "heavy rain",
        71 => "slight snow fall",
        73 => "moderate snow fall",
        75 => "heavy snow fall",
        80 => "slight rain showers",
        81 => "moderate rain showers",
        82 => "violent rain showers",
        95 => "thunderstorm",
        96 => "thunderstorm with slight hail",
        99 => "thunderstorm with heavy hail",
        _ => return format!("unknown (code: {code})"),
    };
    description.to_string()
}

/// Description for an optional code; a missing code is plain "unknown"
#[must_use]
pub fn describe(code: Option<i64>) -> String {
    code.map_or_else(|| "unknown".to_string(), weather_code_to_description)
}
