//! Error types shared by the weather client, the geolocator and the preference store.

use thiserror::Error;

/// Why a current-conditions or forecast lookup failed.
///
/// Every failed lookup maps to exactly one variant; nothing is retried.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Please enter a city name")]
    EmptyCity,

    #[error("City not found: {0}")]
    NotFound(String),

    #[error("Provider rejected the API key")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl LookupError {
    /// Fixed message for the error panel.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCity => "Please enter a city name",
            Self::NotFound(_) => "City not found. Please check the spelling and try again.",
            Self::Unauthorized => "API key issue. Please contact the administrator.",
            Self::Network(_) => "Network error. Please check your internet connection.",
            Self::Provider(_) => "Error fetching weather data. Please try again later.",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Geolocation unavailable: {0}")]
    Unavailable(String),

    #[error("Geolocation denied: {0}")]
    Denied(String),
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "Geolocation is not supported on this system.",
            Self::Denied(_) => "Unable to retrieve your location. Please enable location services.",
        }
    }
}

/// Failures of the persistent key-value store backing preferences.
#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("Preference file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preference file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Could not determine platform data directory")]
    NoDataDir,
}
