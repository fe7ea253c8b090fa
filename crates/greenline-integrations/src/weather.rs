//! OpenWeather current-conditions client
//!
//! One GET per business per watcher cycle. Units are requested metric;
//! wind arrives in m/s and is converted to km/h for threshold checks.

use serde::Deserialize;

use crate::IntegrationError;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainSection,
    wind: Option<WindSection>,
    rain: Option<RainSection>,
    weather: Vec<ConditionSection>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct WindSection {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainSection {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionSection {
    main: String,
}

/// Normalized current conditions for threshold evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub rain_mm_last_hour: f64,
    pub condition: String,
}

/// OpenWeather API client
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch current conditions for a coordinate pair
    pub async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, IntegrationError> {
        let response = self
            .http
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: WeatherResponse = response.json().await?;

        Ok(CurrentConditions {
            temp_c: payload.main.temp,
            // metric responses report wind in m/s
            wind_kph: payload.wind.and_then(|w| w.speed).unwrap_or(0.0) * 3.6,
            rain_mm_last_hour: payload.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
            condition: payload
                .weather
                .into_iter()
                .next()
                .map(|c| c.main)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_response_deserialization() {
        let json = r#"{
            "main": {"temp": 21.4, "humidity": 60},
            "wind": {"speed": 5.0, "deg": 180},
            "rain": {"1h": 2.5},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain"}]
        }"#;
        let payload: WeatherResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.main.temp, 21.4);
        assert_eq!(payload.wind.unwrap().speed, Some(5.0));
        assert_eq!(payload.rain.unwrap().one_hour, Some(2.5));
        assert_eq!(payload.weather[0].main, "Rain");
    }

    #[test]
    fn test_missing_sections_default() {
        let json = r#"{"main": {"temp": -3.0}, "weather": []}"#;
        let payload: WeatherResponse = serde_json::from_str(json).unwrap();
        assert!(payload.wind.is_none());
        assert!(payload.rain.is_none());
    }
}
