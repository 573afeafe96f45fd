//! Resolving "where am I" for location-based lookups.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument};

use crate::{
    config::{LocationConfig, LocationMode},
    error::GeolocationError,
    model::Coordinates,
};

pub const IP_API_URL: &str = "http://ip-api.com/json";

/// One-shot device location request.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Coordinates known up front; `None` means the capability is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        self.0
            .ok_or_else(|| GeolocationError::Unavailable("no location configured".to_string()))
    }
}

/// Approximate location from the public IP address via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self { url: url.to_string(), http: Client::new() }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    #[instrument(skip(self), level = "info")]
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeolocationError::Unavailable(format!("lookup failed with status {status}")));
        }

        let parsed: IpApiResponse =
            res.json().await.map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        if parsed.status != "success" {
            let reason = parsed.message.unwrap_or(parsed.status);
            debug!(%reason, "IP geolocation refused");
            return Err(GeolocationError::Denied(reason));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(GeolocationError::Denied("response carried no coordinates".to_string())),
        }
    }
}

/// Build the geolocator described by the `[location]` config section.
pub fn geolocator_from_config(config: &LocationConfig) -> Box<dyn Geolocator> {
    match config.mode {
        LocationMode::Off => Box::new(FixedLocation(None)),
        LocationMode::Fixed => Box::new(FixedLocation(config.fixed_coordinates())),
        LocationMode::Ip => Box::new(IpGeolocator::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fixed_location_without_coordinates_is_unavailable() {
        let err = FixedLocation(None).locate().await.unwrap_err();
        assert!(matches!(err, GeolocationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn fixed_location_returns_coordinates() {
        let coords = Coordinates::new(35.68, 139.69);
        assert_eq!(FixedLocation(Some(coords)).locate().await, Ok(coords));
    }

    #[tokio::test]
    async fn ip_lookup_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success", "lat": 52.52, "lon": 13.405, "city": "Berlin"
            })))
            .mount(&mock_server)
            .await;

        let locator = IpGeolocator::with_url(&mock_server.uri());
        let coords = locator.locate().await.unwrap();

        assert_eq!(coords, Coordinates::new(52.52, 13.405));
    }

    #[tokio::test]
    async fn ip_lookup_refusal_is_denied() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail", "message": "private range"
            })))
            .mount(&mock_server)
            .await;

        let locator = IpGeolocator::with_url(&mock_server.uri());
        let err = locator.locate().await.unwrap_err();

        assert_eq!(err, GeolocationError::Denied("private range".to_string()));
    }

    #[tokio::test]
    async fn ip_lookup_offline_is_unavailable() {
        let locator = IpGeolocator::with_url("http://127.0.0.1:1");
        let err = locator.locate().await.unwrap_err();

        assert!(matches!(err, GeolocationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn config_off_means_unavailable() {
        assert_eq!(LocationConfig::default().mode, LocationMode::Ip);

        let config = LocationConfig { mode: LocationMode::Off, ..LocationConfig::default() };
        let locator = geolocator_from_config(&config);
        assert!(matches!(locator.locate().await, Err(GeolocationError::Unavailable(_))));
    }
}
