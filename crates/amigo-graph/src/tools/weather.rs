use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolContext, ToolError};

pub const DEFAULT_WEATHER_API: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    latitude: f64,
    longitude: f64,
}

/// Current temperature plus hourly and daily forecast from Open-Meteo
#[derive(Clone)]
pub struct WeatherTool {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_WEATHER_API)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "getWeather"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Get the current weather at a location",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {"type": "number"},
                    "longitude": {"type": "number"}
                },
                "required": ["latitude", "longitude"]
            }),
        )
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
        let WeatherArgs { latitude, longitude } = parse_args(args)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ToolError::InvalidArguments(format!("latitude {} out of range", latitude)));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ToolError::InvalidArguments(format!("longitude {} out of range", longitude)));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m".to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("daily", "sunrise,sunset".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }
}
