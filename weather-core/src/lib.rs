//! Core library for the `weather` screen.
//!
//! This crate defines:
//! - The lookup model and error taxonomy
//! - The OpenWeather client behind the [`WeatherProvider`] trait
//! - The [`ScreenController`] that owns what the screen shows
//! - Display fields derived from a successful lookup
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but any front end can drive the controller
//! and render its state.

pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod provider;
pub mod screen;

pub use config::Config;
pub use display::{ConditionTheme, IconSize, WeatherView};
pub use error::{ErrorKind, ValidationNotice};
pub use model::{RequestState, Units, WeatherQuery, WeatherResult};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use screen::{ScreenController, Submission};
