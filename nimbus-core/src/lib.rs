//! Core library for the `nimbus` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and device geolocation
//! - Persisted preferences (search history, theme)
//! - The presentation contract and the controller sequencing a lookup
//!
//! It is used by `nimbus-cli`, but any front end implementing [`Presenter`] can drive it.

pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod prefs;
pub mod provider;
pub mod view;

pub use config::{Config, LocationConfig, LocationMode, ProviderConfig};
pub use controller::{Controller, LookupState};
pub use error::{GeolocationError, LookupError, PrefsError};
pub use geolocation::{FixedLocation, Geolocator, IpGeolocator};
pub use model::{Coordinates, CurrentConditions, ForecastDay};
pub use prefs::{FileStore, KeyValueStore, MemoryStore, PreferenceStore, SearchHistory, Theme};
pub use provider::WeatherProvider;
pub use view::{Panels, Presenter};
