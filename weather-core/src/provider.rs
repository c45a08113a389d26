use crate::{
    Config, ErrorKind, WeatherQuery, WeatherResult, provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current weather conditions.
///
/// Implementations classify every failure into [`ErrorKind`]; nothing else
/// escapes the call.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, ErrorKind>;
}

/// Construct the OpenWeather client described by `config`.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    let client = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherClient::with_base_url(base_url),
        None => OpenWeatherClient::new(),
    };

    Arc::new(client)
}
