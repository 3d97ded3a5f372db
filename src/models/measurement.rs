use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// One station snapshot row from the measurements export.
///
/// Every metric is optional: an absent value means the station did not
/// report it, which is distinct from reporting zero. Timestamps are naive
/// ISO-8601 strings whose lexicographic order equals chronological order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    #[serde(rename = "measurementid")]
    pub measurement_id: u32,

    #[serde(rename = "stationid")]
    pub station_id: u32,

    pub timestamp: String,

    pub temperature: Option<f64>,

    #[serde(rename = "groundtemperature")]
    pub ground_temperature: Option<f64>,

    #[serde(rename = "feeltemperature")]
    pub feel_temperature: Option<f64>,

    #[serde(rename = "windgusts")]
    pub wind_gusts: Option<f64>,

    #[serde(rename = "windspeedBft")]
    pub wind_speed_bft: Option<f64>,

    pub humidity: Option<f64>,

    pub precipitation: Option<f64>,

    #[serde(rename = "sunpower")]
    pub sun_power: Option<f64>,
}

impl Measurement {
    pub fn new(measurement_id: u32, station_id: u32, timestamp: &str) -> Self {
        Self {
            measurement_id,
            station_id,
            timestamp: timestamp.to_string(),
            temperature: None,
            ground_temperature: None,
            feel_temperature: None,
            wind_gusts: None,
            wind_speed_bft: None,
            humidity: None,
            precipitation: None,
            sun_power: None,
        }
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn with_feel_temperature(mut self, value: f64) -> Self {
        self.feel_temperature = Some(value);
        self
    }

    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        match metric {
            Metric::Temperature => self.temperature = Some(value),
            Metric::GroundTemperature => self.ground_temperature = Some(value),
            Metric::FeelTemperature => self.feel_temperature = Some(value),
            Metric::WindGusts => self.wind_gusts = Some(value),
            Metric::WindSpeedBft => self.wind_speed_bft = Some(value),
            Metric::Humidity => self.humidity = Some(value),
            Metric::Precipitation => self.precipitation = Some(value),
            Metric::SunPower => self.sun_power = Some(value),
        }
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::GroundTemperature => self.ground_temperature,
            Metric::FeelTemperature => self.feel_temperature,
            Metric::WindGusts => self.wind_gusts,
            Metric::WindSpeedBft => self.wind_speed_bft,
            Metric::Humidity => self.humidity,
            Metric::Precipitation => self.precipitation,
            Metric::SunPower => self.sun_power,
        }
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metric(metric).is_some()
    }

    /// Parse the timestamp as a naive local instant. Seconds are optional
    /// because the export truncates them in some snapshots.
    pub fn parsed_timestamp(&self) -> Result<NaiveDateTime> {
        parse_naive_timestamp(&self.timestamp)
    }
}

pub fn parse_naive_timestamp(timestamp: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M"))
        .map_err(|_| DashboardError::InvalidTimestamp(timestamp.to_string()))
}

/// The fixed set of numeric metrics a snapshot may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    GroundTemperature,
    FeelTemperature,
    WindGusts,
    WindSpeedBft,
    Humidity,
    Precipitation,
    SunPower,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Temperature,
        Metric::GroundTemperature,
        Metric::FeelTemperature,
        Metric::WindGusts,
        Metric::WindSpeedBft,
        Metric::Humidity,
        Metric::Precipitation,
        Metric::SunPower,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::GroundTemperature => "groundtemperature",
            Metric::FeelTemperature => "feeltemperature",
            Metric::WindGusts => "windgusts",
            Metric::WindSpeedBft => "windspeed_bft",
            Metric::Humidity => "humidity",
            Metric::Precipitation => "precipitation",
            Metric::SunPower => "sunpower",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature (°C)",
            Metric::GroundTemperature => "Ground temperature (°C)",
            Metric::FeelTemperature => "Feel temperature (°C)",
            Metric::WindGusts => "Wind gusts (m/s)",
            Metric::WindSpeedBft => "Wind speed (Bft)",
            Metric::Humidity => "Humidity (%)",
            Metric::Precipitation => "Precipitation (mm)",
            Metric::SunPower => "Sun power (W/m²)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "temperature" | "temp" => Ok(Metric::Temperature),
            "groundtemperature" | "ground_temperature" => Ok(Metric::GroundTemperature),
            "feeltemperature" | "feel_temperature" => Ok(Metric::FeelTemperature),
            "windgusts" | "wind_gusts" => Ok(Metric::WindGusts),
            "windspeedbft" | "windspeed_bft" | "wind_speed_bft" => Ok(Metric::WindSpeedBft),
            "humidity" => Ok(Metric::Humidity),
            "precipitation" => Ok(Metric::Precipitation),
            "sunpower" | "sun_power" => Ok(Metric::SunPower),
            other => Err(DashboardError::UnknownMetric(other.to_string())),
        }
    }
}
