use serde::{Deserialize, Serialize};

const ICON_BASE: &str = "https://openweathermap.org/img/wn";

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Snapshot of the weather at a location, already rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    /// Celsius, one decimal.
    pub temperature_c: f64,
    /// Celsius, whole degrees.
    pub feels_like_c: i64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    /// Kilometres, one decimal. Not every station reports visibility.
    pub visibility_km: Option<f64>,
    /// Title-cased, e.g. "Light Rain".
    pub description: String,
    pub icon: String,
}

impl CurrentConditions {
    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE}/{}@2x.png", self.icon)
    }
}

/// One representative (local noon) sample of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Short weekday, e.g. "Mon".
    pub weekday: String,
    pub temperature_c: i64,
    pub description: String,
    pub icon: String,
}

impl ForecastDay {
    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE}/{}.png", self.icon)
    }
}

/// Round half towards positive infinity to `decimals` places.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Upper-case the first character of every space-separated word.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_temperature_to_one_decimal() {
        assert_eq!(round_half_up(21.46, 1), 21.5);
        assert_eq!(round_half_up(21.44, 1), 21.4);
        assert_eq!(round_half_up(-3.25, 1), -3.2);
    }

    #[test]
    fn rounds_feels_like_to_integer() {
        assert_eq!(round_half_up(20.4, 0), 20.0);
        assert_eq!(round_half_up(20.5, 0), 21.0);
        assert_eq!(round_half_up(-0.5, 0), 0.0);
    }

    #[test]
    fn title_cases_each_word() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("overcast clouds"), "Overcast Clouds");
        assert_eq!(title_case("clear"), "Clear");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn icon_urls() {
        let day = ForecastDay {
            weekday: "Mon".into(),
            temperature_c: 12,
            description: "rain".into(),
            icon: "10d".into(),
        };
        assert_eq!(day.icon_url(), "https://openweathermap.org/img/wn/10d.png");
    }
}
