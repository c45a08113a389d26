//! Display fields derived from a [`WeatherResult`].
//!
//! Nothing here is stored: every value is recomputed from the current
//! success state whenever the view asks for it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Units, WeatherResult};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Resolution variant of the provider's condition icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    /// `@2x`
    Medium,
    /// `@4x`
    #[default]
    Large,
}

impl IconSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconSize::Medium => "medium",
            IconSize::Large => "large",
        }
    }

    fn scale(&self) -> u8 {
        match self {
            IconSize::Medium => 2,
            IconSize::Large => 4,
        }
    }
}

impl fmt::Display for IconSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn icon_url(icon_id: &str, size: IconSize) -> String {
    format!("{ICON_BASE_URL}/{icon_id}@{}x.png", size.scale())
}

/// `15.2` in metric becomes `"15.2 °C"`.
pub fn format_temperature(value: f64, units: Units) -> String {
    format!("{value} {}", units.suffix())
}

/// Inverse of [`format_temperature`].
pub fn parse_temperature(label: &str, units: Units) -> Option<f64> {
    label.strip_suffix(units.suffix())?.trim_end().parse().ok()
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Background tint for the result card, picked from the condition description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionTheme {
    Clear,
    Clouds,
    Rain,
    Snow,
    Default,
}

impl ConditionTheme {
    pub fn from_description(description: &str) -> Self {
        let description = description.to_lowercase();
        if description.contains("clear") {
            ConditionTheme::Clear
        } else if description.contains("cloud") {
            ConditionTheme::Clouds
        } else if description.contains("rain") {
            ConditionTheme::Rain
        } else if description.contains("snow") {
            ConditionTheme::Snow
        } else {
            ConditionTheme::Default
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            ConditionTheme::Clear | ConditionTheme::Default => "#0288D1",
            ConditionTheme::Clouds => "#546E7A",
            ConditionTheme::Rain => "#01579B",
            ConditionTheme::Snow => "#78909C",
        }
    }
}

/// Everything the view renders for a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub location: String,
    pub temperature: String,
    pub description: String,
    pub icon_url: String,
    pub theme: ConditionTheme,
}

impl WeatherView {
    pub fn from_result(result: &WeatherResult, units: Units, icon_size: IconSize) -> Self {
        Self {
            location: result.location_name().to_string(),
            temperature: format_temperature(result.temperature(), units),
            description: capitalize_first(result.condition_description()),
            icon_url: icon_url(result.icon_id(), icon_size),
            theme: ConditionTheme::from_description(result.condition_description()),
        }
    }
}
