use weather_core::{IconSize, RequestState, Units, WeatherView};

/// Text shown for the current screen state.
pub fn render_state(state: &RequestState, units: Units, icon_size: IconSize) -> String {
    match state {
        RequestState::Idle => String::new(),
        RequestState::Loading => "Loading...".to_string(),
        RequestState::Success(result) => {
            render_view(&WeatherView::from_result(result, units, icon_size))
        }
        RequestState::Failed(err) => format!("! {err}"),
    }
}

pub fn render_view(view: &WeatherView) -> String {
    format!(
        "{}\n  {}  {}\n  icon: {}",
        view.location, view.temperature, view.description, view.icon_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{ErrorKind, WeatherResult};

    #[test]
    fn renders_success_card() {
        let result = WeatherResult::new("London", 15.2, "clear sky", "01d");
        let text = render_state(&RequestState::Success(result), Units::Metric, IconSize::Medium);

        assert_eq!(
            text,
            "London\n  15.2 °C  Clear sky\n  icon: https://openweathermap.org/img/wn/01d@2x.png"
        );
    }

    #[test]
    fn success_card_follows_units_and_icon_size() {
        let result = WeatherResult::new("Denver", 59.0, "light rain", "10d");
        let text = render_state(&RequestState::Success(result), Units::Imperial, IconSize::Large);

        assert!(text.contains("59 °F  Light rain"));
        assert!(text.ends_with("10d@4x.png"));
    }

    #[test]
    fn renders_loading_and_failure() {
        let render = |state: &RequestState| render_state(state, Units::Metric, IconSize::Large);

        assert_eq!(render(&RequestState::Loading), "Loading...");
        assert_eq!(render(&RequestState::Idle), "");
        assert_eq!(render(&RequestState::Failed(ErrorKind::CityNotFound)), "! City not found");
        assert_eq!(
            render(&RequestState::Failed(ErrorKind::Unknown("timed out".into()))),
            "! Error: timed out"
        );
    }
}
