use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::LookupError,
    model::{Coordinates, CurrentConditions, ForecastDay, round_half_up, title_case},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Days kept from the forecast series.
const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET `{base_url}/{endpoint}` in metric units and return the body of a
    /// successful envelope.
    async fn get(
        &self,
        endpoint: &str,
        target: &str,
        query: &[(&str, String)],
    ) -> Result<String, LookupError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, target, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(LookupError::Network)?;

        let status = res.status();
        // Reading the body only fails on transport; JSON problems surface in serde_json.
        let body = res.text().await.map_err(LookupError::Network)?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(classify(status.as_u16(), target, &body));
        }

        // Some failures arrive as HTTP 200 with an error code in the envelope.
        if let Ok(envelope) = serde_json::from_str::<OwEnvelope>(&body) {
            if let Some(code) = envelope.cod.and_then(|c| c.as_u16()) {
                if code != 200 {
                    let message = envelope.message.map(|m| m.to_string()).unwrap_or_default();
                    return Err(classify(code, target, &message));
                }
            }
        }

        Ok(body)
    }
}

fn classify(code: u16, target: &str, detail: &str) -> LookupError {
    match StatusCode::from_u16(code) {
        Ok(StatusCode::NOT_FOUND) => LookupError::NotFound(target.to_string()),
        Ok(StatusCode::UNAUTHORIZED) => LookupError::Unauthorized,
        _ => LookupError::Provider(format!("status {code}: {}", truncate_body(detail))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(u16),
    Text(String),
}

impl OwCode {
    fn as_u16(&self) -> Option<u16> {
        match self {
            OwCode::Number(n) => Some(*n),
            OwCode::Text(s) => s.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<OwCode>,
    /// A string on errors, a number on some successful forecast replies.
    message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn parse_current(body: &str) -> Result<CurrentConditions, LookupError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::Provider(format!("malformed current weather JSON: {e}")))?;

    let (description, icon) = parsed
        .weather
        .first()
        .map(|w| (title_case(&w.description), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

    Ok(CurrentConditions {
        city: parsed.name,
        country: parsed.sys.country.unwrap_or_default(),
        temperature_c: round_half_up(parsed.main.temp, 1),
        feels_like_c: round_half_up(parsed.main.feels_like, 0) as i64,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        pressure_hpa: parsed.main.pressure,
        visibility_km: parsed.visibility.map(|m| round_half_up(f64::from(m) / 1000.0, 1)),
        description,
        icon,
    })
}

fn parse_forecast(body: &str) -> Result<Vec<ForecastDay>, LookupError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::Provider(format!("malformed forecast JSON: {e}")))?;

    Ok(select_noon_entries(parsed.list))
}

/// Keep the 12:00:00 sample of each day, oldest first, at most [`FORECAST_DAYS`].
fn select_noon_entries(list: Vec<OwForecastEntry>) -> Vec<ForecastDay> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0);

    let mut samples: Vec<(NaiveDateTime, OwForecastEntry)> = list
        .into_iter()
        .filter_map(|entry| {
            NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S")
                .ok()
                .filter(|at| Some(at.time()) == noon)
                .map(|at| (at, entry))
        })
        .collect();

    samples.sort_by_key(|(at, _)| *at);
    samples.dedup_by_key(|(at, _)| at.date());

    samples
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(at, entry)| {
            let (description, icon) = entry
                .weather
                .into_iter()
                .next()
                .map(|w| (w.description, w.icon))
                .unwrap_or_else(|| ("unknown".to_string(), String::new()));

            ForecastDay {
                weekday: at.format("%a").to_string(),
                temperature_c: round_half_up(entry.main.temp, 0) as i64,
                description,
                icon,
            }
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch_current_by_name(&self, city: &str) -> Result<CurrentConditions, LookupError> {
        let body = self.get("weather", city, &[("q", city.to_string())]).await?;
        parse_current(&body)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_current_by_coords(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentConditions, LookupError> {
        let target = format!("{},{}", coords.latitude, coords.longitude);
        let query = [("lat", coords.latitude.to_string()), ("lon", coords.longitude.to_string())];

        let body = self.get("weather", &target, &query).await?;
        parse_current(&body)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_forecast_by_name(&self, city: &str) -> Result<Vec<ForecastDay>, LookupError> {
        let body = self.get("forecast", city, &[("q", city.to_string())]).await?;
        parse_forecast(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
