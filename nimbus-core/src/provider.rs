use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::LookupError,
    model::{Coordinates, CurrentConditions, ForecastDay},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// A remote source of current conditions and the 5-day forecast.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current_by_name(&self, city: &str) -> Result<CurrentConditions, LookupError>;

    async fn fetch_current_by_coords(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentConditions, LookupError>;

    /// Up to five noon samples, one per day, in chronological order.
    async fn fetch_forecast_by_name(&self, city: &str) -> Result<Vec<ForecastDay>, LookupError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = match config.base_url() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key, base_url),
        None => OpenWeatherProvider::new(api_key),
    };

    Ok(Box::new(provider))
}
