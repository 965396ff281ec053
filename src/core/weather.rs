//! Hourly rainfall records and the forecast-archive format they come from.

use serde::{Deserialize, Serialize};

/// Hourly forecast-archive export, `{"hourly": {"time": [...], "precipitation": [...]}}`.
///
/// Only the hourly precipitation series is read; other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub hourly: HourlySeries,
}

/// Parallel hourly columns. `time` holds Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<i64>,
    /// Precipitation in millimetres; `None` for hours without a reading.
    pub precipitation: Vec<Option<f64>>,
}

/// Rainfall for one hour as consumed by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub time: i64,
    pub rainfall: f64,
}

impl WeatherRecord {
    pub fn new(time: i64, rainfall: f64) -> Self {
        Self { time, rainfall }
    }
}

/// Hourly rainfall keyed the way the engine reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    #[serde(rename = "weatherData")]
    pub records: Vec<WeatherRecord>,
}

impl WeatherData {
    pub fn new(records: Vec<WeatherRecord>) -> Self {
        Self { records }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourly_weather_ignores_other_fields() {
        let json = r#"{
            "latitude": -36.85,
            "hourly_units": {"time": "unixtime", "precipitation": "mm"},
            "hourly": {"time": [0, 3600], "precipitation": [0.4, null]}
        }"#;
        let weather: HourlyWeather = serde_json::from_str(json).unwrap();

        assert_eq!(weather.hourly.time, vec![0, 3600]);
        assert_eq!(weather.hourly.precipitation, vec![Some(0.4), None]);
    }

    #[test]
    fn test_weather_data_json_schema() {
        let data = WeatherData::new(vec![WeatherRecord::new(3600, 1.5)]);
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"weatherData": [{"time": 3600, "rainfall": 1.5}]})
        );
    }
}
