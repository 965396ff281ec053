//! Hourly rainfall preparation.
//!
//! Converts a forecast-archive precipitation series into engine records and
//! locates the wettest hour.

use log::{info, warn};
use thiserror::Error;

use crate::core::weather::{HourlyWeather, WeatherData, WeatherRecord};

#[derive(Debug, Error, PartialEq)]
pub enum WeatherError {
    #[error("Hourly series length mismatch: {times} times, {readings} precipitation readings")]
    LengthMismatch { times: usize, readings: usize },
}

/// Pair each hour with its rainfall, counting missing readings as zero.
pub fn rainfall_series(weather: &HourlyWeather) -> Result<WeatherData, WeatherError> {
    let hourly = &weather.hourly;
    if hourly.time.len() != hourly.precipitation.len() {
        return Err(WeatherError::LengthMismatch {
            times: hourly.time.len(),
            readings: hourly.precipitation.len(),
        });
    }

    let missing = hourly.precipitation.iter().filter(|p| p.is_none()).count();
    if missing > 0 {
        warn!("{} of {} hours have no precipitation reading", missing, hourly.time.len());
    }

    let records = hourly
        .time
        .iter()
        .zip(&hourly.precipitation)
        .map(|(&time, rain)| WeatherRecord::new(time, rain.unwrap_or(0.0)))
        .collect();

    Ok(WeatherData::new(records))
}

/// Index of the wettest hour. Ties resolve to the earliest hour.
pub fn peak_hour(data: &WeatherData) -> Option<usize> {
    let mut peak: Option<(usize, f64)> = None;
    for (idx, record) in data.records.iter().enumerate() {
        match peak {
            Some((_, best)) if record.rainfall <= best => {}
            _ => peak = Some((idx, record.rainfall)),
        }
    }

    if let Some((idx, rainfall)) = peak {
        info!(
            "Max hourly rain: {}mm at {}",
            rainfall, data.records[idx].time
        );
    }
    peak.map(|(idx, _)| idx)
}

/// Records within `half_width` hours either side of `center`, clipped to the series.
///
/// The window is `center - half_width .. center + half_width` (end exclusive).
pub fn peak_window(data: &WeatherData, center: usize, half_width: usize) -> &[WeatherRecord] {
    let len = data.records.len();
    let start = center.saturating_sub(half_width).min(len);
    let end = center.saturating_add(half_width).min(len);
    &data.records[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::weather::HourlySeries;

    fn hourly(time: Vec<i64>, precipitation: Vec<Option<f64>>) -> HourlyWeather {
        HourlyWeather {
            hourly: HourlySeries { time, precipitation },
        }
    }

    fn series(rain: &[f64]) -> WeatherData {
        WeatherData::new(
            rain.iter()
                .enumerate()
                .map(|(i, &r)| WeatherRecord::new(i as i64 * 3600, r))
                .collect(),
        )
    }

    #[test]
    fn test_missing_readings_become_zero() {
        let weather = hourly(vec![0, 3600, 7200], vec![Some(1.2), None, Some(0.0)]);
        let data = rainfall_series(&weather).unwrap();

        assert_eq!(
            data.records,
            vec![
                WeatherRecord::new(0, 1.2),
                WeatherRecord::new(3600, 0.0),
                WeatherRecord::new(7200, 0.0),
            ]
        );
    }

    #[test]
    fn test_length_mismatch() {
        let weather = hourly(vec![0, 3600], vec![Some(1.0)]);
        assert_eq!(
            rainfall_series(&weather),
            Err(WeatherError::LengthMismatch { times: 2, readings: 1 })
        );
    }

    #[test]
    fn test_peak_hour_first_maximum() {
        assert_eq!(peak_hour(&series(&[0.0, 3.5, 1.0, 3.5])), Some(1));
        assert_eq!(peak_hour(&series(&[0.0, 0.0])), Some(0));
        assert_eq!(peak_hour(&WeatherData::default()), None);
    }

    #[test]
    fn test_peak_hour_after_missing_readings() {
        let weather = hourly(vec![0, 3600, 7200], vec![None, Some(4.0), None]);
        let data = rainfall_series(&weather).unwrap();
        assert_eq!(peak_hour(&data), Some(1));
    }

    #[test]
    fn test_peak_window_clipped() {
        let data = series(&[0.0; 10]);

        let window = peak_window(&data, 5, 2);
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].time, 3 * 3600);

        assert_eq!(peak_window(&data, 1, 500).len(), 10);
        assert_eq!(peak_window(&data, 9, 3)[0].time, 6 * 3600);
        assert!(peak_window(&WeatherData::default(), 0, 5).is_empty());
    }
}
