use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{ErrorKind, WeatherQuery, WeatherResult};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: &str, http: Client) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http }
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherResult, ErrorKind> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        debug!("Requesting current weather for '{}' ({})", query.city(), query.units());

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.city()),
                ("appid", query.api_key()),
                ("units", query.units().as_str()),
            ])
            .send()
            .await
            // The request URL carries the API key, keep it out of the message.
            .map_err(|e| {
                ErrorKind::Unknown(format!(
                    "Failed to send request to OpenWeather: {}",
                    e.without_url()
                ))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            ErrorKind::Unknown(format!(
                "Failed to read OpenWeather response body: {}",
                e.without_url()
            ))
        })?;

        classify_response(status, &body)
    }
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, ErrorKind> {
        let outcome = self.fetch_current(query).await;
        if let Err(err) = &outcome {
            warn!("Weather lookup for '{}' failed: {err}", query.city());
        }
        outcome
    }
}

/// Turn a provider answer into a result or a classified failure.
pub fn classify_response(status: StatusCode, body: &str) -> Result<WeatherResult, ErrorKind> {
    if status.is_success() {
        let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(|e| {
            ErrorKind::Unknown(format!("Failed to parse OpenWeather current JSON: {e}"))
        })?;

        // Only the first reported condition is shown.
        let condition = parsed.weather.into_iter().next().ok_or(ErrorKind::MalformedResponse)?;

        return Ok(WeatherResult::new(
            parsed.name,
            parsed.main.temp,
            condition.description,
            condition.icon,
        ));
    }

    let message = serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_default()
        .to_lowercase();

    if status == StatusCode::NOT_FOUND || message == "city not found" {
        Err(ErrorKind::CityNotFound)
    } else if status == StatusCode::UNAUTHORIZED || message.contains("invalid api key") {
        Err(ErrorKind::InvalidApiKey)
    } else {
        Err(ErrorKind::Unknown(format!(
            "OpenWeather request failed with status {}: {}",
            status,
            truncate_body(body),
        )))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Units;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    const LONDON: &str = r#"{"name":"London","main":{"temp":15.2},"weather":[{"description":"clear sky","icon":"01d"}]}"#;

    /// Answers a single HTTP request with `status_line` and `body`, yielding the request line.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&buf).lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn client(base_url: &str) -> OpenWeatherClient {
        let http = Client::builder().no_proxy().build().unwrap();
        OpenWeatherClient::with_http(base_url, http)
    }

    fn london_query() -> WeatherQuery {
        WeatherQuery::new("London", Units::Metric, "KEY").unwrap()
    }

    #[test]
    fn parses_first_condition() {
        let result = classify_response(StatusCode::OK, LONDON).unwrap();
        assert_eq!(result, WeatherResult::new("London", 15.2, "clear sky", "01d"));
    }

    #[test]
    fn uses_only_first_of_many_conditions() {
        let body = r#"{"name":"Oslo","main":{"temp":-3.5},"weather":[
            {"description":"light snow","icon":"13n"},
            {"description":"mist","icon":"50n"}]}"#;
        let result = classify_response(StatusCode::OK, body).unwrap();
        assert_eq!(result.condition_description(), "light snow");
        assert_eq!(result.icon_id(), "13n");
    }

    #[test]
    fn empty_condition_list_is_malformed() {
        let body = r#"{"name":"London","main":{"temp":15.2},"weather":[]}"#;
        assert_eq!(classify_response(StatusCode::OK, body), Err(ErrorKind::MalformedResponse));
    }

    #[test]
    fn undecodable_success_body_is_unknown() {
        let err = classify_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ErrorKind::Unknown(msg) if msg.contains("Failed to parse")));
    }

    #[test]
    fn not_found_status_and_message() {
        assert_eq!(classify_response(StatusCode::NOT_FOUND, ""), Err(ErrorKind::CityNotFound));

        let body = r#"{"cod":"404","message":"city not found"}"#;
        assert_eq!(classify_response(StatusCode::BAD_REQUEST, body), Err(ErrorKind::CityNotFound));
    }

    #[test]
    fn unauthorized_status_and_message() {
        assert_eq!(classify_response(StatusCode::UNAUTHORIZED, ""), Err(ErrorKind::InvalidApiKey));

        let body = r#"{"cod":401,"message":"Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#;
        assert_eq!(classify_response(StatusCode::FORBIDDEN, body), Err(ErrorKind::InvalidApiKey));
    }

    #[test]
    fn other_statuses_are_unknown_with_truncated_body() {
        let body = "x".repeat(500);
        let err = classify_response(StatusCode::INTERNAL_SERVER_ERROR, &body).unwrap_err();
        let msg = match err {
            ErrorKind::Unknown(msg) => msg,
            other => panic!("expected Unknown, got {other:?}"),
        };
        assert!(msg.contains("500"));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 300);
    }

    #[tokio::test]
    async fn fetch_sends_query_parameters_and_parses_body() {
        let (base_url, server) = serve_once("200 OK", LONDON).await;

        let result = client(&base_url).fetch(&london_query()).await.unwrap();
        assert_eq!(result, WeatherResult::new("London", 15.2, "clear sky", "01d"));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /data/2.5/weather?"));
        assert!(request_line.contains("q=London"));
        assert!(request_line.contains("appid=KEY"));
        assert!(request_line.contains("units=metric"));
    }

    #[tokio::test]
    async fn fetch_maps_404_to_city_not_found() {
        let (base_url, server) =
            serve_once("404 Not Found", r#"{"cod":"404","message":"city not found"}"#).await;

        let err = client(&base_url).fetch(&london_query()).await.unwrap_err();
        assert_eq!(err, ErrorKind::CityNotFound);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_maps_401_to_invalid_api_key() {
        let (base_url, server) = serve_once("401 Unauthorized", r#"{"cod":401}"#).await;

        let err = client(&base_url).fetch(&london_query()).await.unwrap_err();
        assert_eq!(err, ErrorKind::InvalidApiKey);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_reports_connection_failure_without_api_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}")).fetch(&london_query()).await.unwrap_err();
        let msg = match err {
            ErrorKind::Unknown(msg) => msg,
            other => panic!("expected Unknown, got {other:?}"),
        };
        assert!(msg.contains("Failed to send request"));
        assert!(!msg.contains("KEY"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenWeatherClient::with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
