//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding and forecast clients behind small async traits
//! - The city store and its SQLite implementation
//! - Controllers for the add-city and refresh flows
//!
//! It is used by `cityweather-cli`, but a GUI front end can drive the same
//! controllers.

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod provider;
pub mod store;
pub mod validation;

pub use config::Config;
pub use controller::{AddCityController, CityListController, CityListEvent};
pub use error::{Field, ForecastError, GeocodeError, StoreError, ValidationError};
pub use model::{City, CityCandidate, GeocodeMatch};
pub use provider::{
    ForecastSource, Geocoder, nominatim::GeocodingClient, openmeteo::ForecastClient,
};
pub use store::{CityStore, MemoryCityStore, SqliteCityStore};
