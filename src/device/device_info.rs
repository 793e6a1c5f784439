//! Typed device-info records.
//!
//! The event source and the persisted config entry both describe a device as
//! a JSON object with a composite `id` (`"<protocol>_<device_id>"`), an
//! optional `unit`, an optional `value` and an optional `sensor` marker.
//! [`RawDeviceInfo`] is that wire shape; [`DeviceInfo`] is the validated form
//! handed to the rest of the crate.

use crate::error::{Result, RfplayerError};
use crate::sensors::SensorType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event category / config marker for sensor-kind devices.
pub const EVENT_KEY_SENSOR: &str = "sensor";

/// Identity of a physical device: protocol plus protocol-local id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId {
    protocol: String,
    device_id: String,
}

impl DeviceId {
    pub fn new(protocol: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            device_id: device_id.into(),
        }
    }

    /// Split a composite id on its first `_`.
    ///
    /// Everything after the first separator belongs to the device id, so
    /// `"X10_12_3"` yields protocol `X10` and device id `12_3`.
    pub fn parse(composite: &str) -> Result<Self> {
        match composite.split_once('_') {
            Some((protocol, device_id)) if !protocol.is_empty() => {
                Ok(Self::new(protocol, device_id))
            }
            _ => Err(RfplayerError::MalformedDeviceId(composite.to_string())),
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The `"<protocol>_<device_id>"` form used as lookup key.
    pub fn composite(&self) -> String {
        format!("{}_{}", self.protocol, self.device_id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.protocol, self.device_id)
    }
}

/// Measured value as reported by the receiver.
///
/// The parser emits values as strings; numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Number(f64),
    Text(String),
}

impl EventValue {
    /// Interpret the value as a float. `id` is only used for the error.
    pub fn as_f64(&self, id: &str) -> Result<f64> {
        match self {
            EventValue::Number(n) => Ok(*n),
            EventValue::Text(s) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|source| RfplayerError::InvalidValue {
                        id: id.to_string(),
                        value: s.clone(),
                        source,
                    })
            }
        }
    }
}

impl From<&str> for EventValue {
    fn from(s: &str) -> Self {
        EventValue::Text(s.to_string())
    }
}

impl From<f64> for EventValue {
    fn from(n: f64) -> Self {
        EventValue::Number(n)
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventValue::Number(n) => write!(f, "{n}"),
            EventValue::Text(s) => f.write_str(s),
        }
    }
}

/// Device-info record as it appears on the wire and in the config entry.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeviceInfo {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<EventValue>,

    /// Sensor-kind marker. Its presence is what matters; a string value
    /// names the sensor type (`"temperature"`, `"humidity"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<serde_json::Value>,
}

/// Validated device-info record.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub unit: Option<String>,
    pub value: Option<EventValue>,
    pub sensor: Option<serde_json::Value>,
}

impl DeviceInfo {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            unit: None,
            value: None,
            sensor: None,
        }
    }

    /// Parse and validate one JSON record.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDeviceInfo = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<EventValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_sensor(mut self, marker: impl Into<serde_json::Value>) -> Self {
        self.sensor = Some(marker.into());
        self
    }

    /// Whether the record carries the sensor-kind marker.
    pub fn is_sensor(&self) -> bool {
        self.sensor.is_some()
    }

    /// Sensor type named by the marker, if it names a known one.
    pub fn sensor_type(&self) -> Option<SensorType> {
        self.sensor
            .as_ref()
            .and_then(|marker| marker.as_str())
            .and_then(|label| label.parse().ok())
    }
}

impl TryFrom<RawDeviceInfo> for DeviceInfo {
    type Error = RfplayerError;

    fn try_from(raw: RawDeviceInfo) -> Result<Self> {
        Ok(Self {
            id: DeviceId::parse(&raw.id)?,
            unit: raw.unit,
            value: raw.value,
            sensor: raw.sensor,
        })
    }
}
