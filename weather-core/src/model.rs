use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{ErrorKind, ValidationNotice};

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value sent as the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// A validated lookup built from the current input on each submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
    units: Units,
    api_key: String,
}

impl WeatherQuery {
    /// Trims `city` and rejects it when nothing is left.
    pub fn new(
        city: &str,
        units: Units,
        api_key: impl Into<String>,
    ) -> Result<Self, ValidationNotice> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ValidationNotice::EmptyInput);
        }

        Ok(Self { city: city.to_string(), units, api_key: api_key.into() })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Current conditions for one location, as returned by a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    location_name: String,
    temperature: f64,
    condition_description: String,
    icon_id: String,
}

impl WeatherResult {
    pub fn new(
        location_name: impl Into<String>,
        temperature: f64,
        condition_description: impl Into<String>,
        icon_id: impl Into<String>,
    ) -> Self {
        Self {
            location_name: location_name.into(),
            temperature,
            condition_description: condition_description.into(),
            icon_id: icon_id.into(),
        }
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    /// Temperature in the units the query asked for.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn condition_description(&self) -> &str {
        &self.condition_description
    }

    pub fn icon_id(&self) -> &str {
        &self.icon_id
    }
}

/// What the screen is currently showing. Replaced as a whole on every transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(WeatherResult),
    Failed(ErrorKind),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        match self {
            RequestState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorKind> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }
}
