//! Sensor entity for one RFPlayer device.
//!
//! Holds the latest reading of a device and exposes it to the host. Values
//! arrive as device-info events and are stored as `f64`; there is no history.
//!
//! # Example
//! ```ignore
//! let sensor = Arc::new(RfplayerSensor::from_device_info(&info));
//! platform.add_entities(vec![sensor.clone()]).await?;
//!
//! // Event source delivers a reading
//! sensor.handle_event(&event)?;
//!
//! // Host reads the value on demand
//! let value = sensor.state();
//! ```

use super::{NotifiableSensor, Sensor, SensorType, StateNotifier};
use crate::device::{DeviceId, DeviceInfo};
use crate::error::{Result, RfplayerError};
use crate::platform::IntegrationData;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// Protocol name of the receiver's built-in jamming detector.
pub const JAMMING_PROTOCOL: &str = "JAMMING";

pub struct RfplayerSensor {
    protocol: String,
    device_id: String,
    name: Option<String>,
    unit_of_measurement: Option<String>,
    /// Record the entity was created from. Absent for static entities.
    initial_event: Option<DeviceInfo>,
    state: RwLock<Option<f64>>,
    last_updated: RwLock<Option<DateTime<Utc>>>,
    version: AtomicU32,
    /// Assigned by the host when the entity is added.
    entity_id: OnceLock<String>,
    notifier: RwLock<Option<StateNotifier>>,
}

impl RfplayerSensor {
    pub fn new(protocol: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            device_id: device_id.into(),
            name: None,
            unit_of_measurement: None,
            initial_event: None,
            state: RwLock::new(None),
            last_updated: RwLock::new(None),
            version: AtomicU32::new(0),
            entity_id: OnceLock::new(),
            notifier: RwLock::new(None),
        }
    }

    /// The receiver's jamming detector. Always present, no unit.
    pub fn jamming() -> Self {
        Self::new(JAMMING_PROTOCOL, "0").with_name("Jamming detection")
    }

    /// Build a sensor from a device-info record.
    ///
    /// The record's declared unit wins; otherwise the unit is looked up from
    /// the sensor type named by its marker.
    pub fn from_device_info(info: &DeviceInfo) -> Self {
        let unit = info
            .unit
            .clone()
            .or_else(|| info.sensor_type().and_then(|t| t.unit()).map(String::from));

        let sensor = Self::new(info.id.protocol(), info.id.device_id())
            .with_initial_event(info.clone());
        match unit {
            Some(unit) => sensor.with_unit(unit),
            None => sensor,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn with_initial_event(mut self, event: DeviceInfo) -> Self {
        self.initial_event = Some(event);
        self
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn unit_of_measurement(&self) -> Option<&str> {
        self.unit_of_measurement.as_deref()
    }

    pub fn initial_event(&self) -> Option<&DeviceInfo> {
        self.initial_event.as_ref()
    }

    /// Stable identity: the composite `"<protocol>_<device_id>"`.
    pub fn unique_id(&self) -> String {
        DeviceId::new(&*self.protocol, &*self.device_id).composite()
    }

    /// Key under which the entity is published in the entity lookup.
    pub fn lookup_key(&self) -> String {
        match &self.initial_event {
            Some(event) => event.id.composite(),
            None => self.unique_id(),
        }
    }

    /// Host-assigned entity id, once added.
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.get().map(String::as_str)
    }

    pub fn sensor_type(&self) -> Option<SensorType> {
        if self.protocol == JAMMING_PROTOCOL {
            return Some(SensorType::Jamming);
        }
        self.initial_event.as_ref().and_then(DeviceInfo::sensor_type)
    }

    pub fn icon(&self) -> Option<&'static str> {
        self.sensor_type().map(|t| t.icon())
    }

    /// Current value; `None` until the first event.
    pub fn state(&self) -> Option<f64> {
        *self.state.read()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.read()
    }

    /// Called by the host once it has attached the entity.
    ///
    /// Records the assigned entity id and publishes the entity in the shared
    /// entity lookup. A value carried by the initial event becomes the first
    /// reading.
    pub fn added_to_hass(
        self: &Arc<Self>,
        entity_id: String,
        data: &IntegrationData,
    ) -> Result<()> {
        self.entity_id
            .set(entity_id)
            .map_err(RfplayerError::AlreadyAdded)?;

        let key = self.lookup_key();
        debug!("Registering {} as {}", key, self.entity_id().unwrap_or_default());
        data.entity_lookup.insert(key, Arc::clone(self));

        if let Some(event) = &self.initial_event
            && event.value.is_some()
            && let Err(e) = self.handle_event(event)
        {
            warn!("Ignoring initial value of {}: {}", self.unique_id(), e);
        }
        Ok(())
    }

    /// Store the value carried by `event`.
    ///
    /// A missing or non-numeric value is rejected and the current value is
    /// left untouched.
    pub fn handle_event(&self, event: &DeviceInfo) -> Result<f64> {
        let value = event
            .value
            .as_ref()
            .ok_or_else(|| RfplayerError::MissingValue(self.unique_id()))?
            .as_f64(&self.unique_id())?;
        self.set(value);
        Ok(value)
    }

    fn set(&self, value: f64) {
        let now = Utc::now();
        *self.state.write() = Some(value);
        *self.last_updated.write() = Some(now);
        self.version.fetch_add(1, Ordering::SeqCst);
        if let Some(notifier) = self.notifier.read().as_ref() {
            notifier.notify(Some(value), now);
        }
    }
}

impl NotifiableSensor for RfplayerSensor {
    fn set_notifier(&self, notifier: StateNotifier) {
        *self.notifier.write() = Some(notifier);
    }
}

impl Sensor for RfplayerSensor {
    fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    fn humidity_info() -> DeviceInfo {
        DeviceInfo::new(DeviceId::new("X10", "12"))
            .with_unit("%")
            .with_sensor(true)
    }

    fn event(value: &str) -> DeviceInfo {
        DeviceInfo::new(DeviceId::new("X10", "12")).with_value(value)
    }

    #[test]
    fn test_initial_state() {
        let sensor = RfplayerSensor::from_device_info(&humidity_info());
        assert_eq!(sensor.protocol(), "X10");
        assert_eq!(sensor.device_id(), "12");
        assert_eq!(sensor.unit_of_measurement(), Some("%"));
        assert_eq!(sensor.unique_id(), "X10_12");
        assert_eq!(sensor.state(), None);
        assert_eq!(sensor.last_updated(), None);
        assert_eq!(sensor.version(), 0);
        assert_eq!(sensor.entity_id(), None);
    }

    #[test]
    fn test_handle_event_stores_float() {
        let sensor = RfplayerSensor::from_device_info(&humidity_info());
        assert_eq!(sensor.handle_event(&event("21.5")).unwrap(), 21.5);
        assert_eq!(sensor.state(), Some(21.5));
        assert_eq!(sensor.version(), 1);
        assert!(sensor.last_updated().is_some());

        // Only the latest value is kept
        sensor.handle_event(&event("22")).unwrap();
        assert_eq!(sensor.state(), Some(22.0));
        assert_eq!(sensor.version(), 2);
    }

    #[test]
    fn test_invalid_value_leaves_state_unchanged() {
        let sensor = RfplayerSensor::from_device_info(&humidity_info());
        sensor.handle_event(&event("40")).unwrap();

        assert!(matches!(
            sensor.handle_event(&event("abc")),
            Err(RfplayerError::InvalidValue { .. })
        ));
        assert_eq!(sensor.state(), Some(40.0));
        assert_eq!(sensor.version(), 1);
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let sensor = RfplayerSensor::from_device_info(&humidity_info());
        assert!(matches!(
            sensor.handle_event(&humidity_info()),
            Err(RfplayerError::MissingValue(id)) if id == "X10_12"
        ));
        assert_eq!(sensor.state(), None);
    }

    #[test]
    fn test_unit_falls_back_to_sensor_type() {
        let info = DeviceInfo::new(DeviceId::new("OREGON", "33")).with_sensor("temperature");
        let sensor = RfplayerSensor::from_device_info(&info);
        assert_eq!(sensor.unit_of_measurement(), Some("°C"));
        assert_eq!(sensor.icon(), Some("mdi:thermometer"));

        let info = DeviceInfo::new(DeviceId::new("OREGON", "34")).with_sensor(true);
        let sensor = RfplayerSensor::from_device_info(&info);
        assert_eq!(sensor.unit_of_measurement(), None);
        assert_eq!(sensor.icon(), None);
    }

    #[test]
    fn test_jamming_sensor() {
        let sensor = RfplayerSensor::jamming();
        assert_eq!(sensor.unique_id(), "JAMMING_0");
        assert_eq!(sensor.lookup_key(), "JAMMING_0");
        assert_eq!(sensor.name(), Some("Jamming detection"));
        assert_eq!(sensor.unit_of_measurement(), None);
        assert!(sensor.initial_event().is_none());
        assert_eq!(sensor.sensor_type(), Some(SensorType::Jamming));
    }

    #[test]
    fn test_added_to_hass_registers_once() {
        let data = IntegrationData::new();
        let sensor = Arc::new(RfplayerSensor::from_device_info(&humidity_info()));

        sensor.added_to_hass("sensor.x10_12".into(), &data).unwrap();
        assert_eq!(sensor.entity_id(), Some("sensor.x10_12"));
        let registered = data.entity_lookup.get("X10_12").unwrap();
        assert!(Arc::ptr_eq(&registered, &sensor));

        assert!(matches!(
            sensor.added_to_hass("sensor.other".into(), &data),
            Err(RfplayerError::AlreadyAdded(id)) if id == "sensor.other"
        ));
        assert_eq!(sensor.entity_id(), Some("sensor.x10_12"));
        assert_eq!(data.entity_lookup.len(), 1);
    }

    #[test]
    fn test_initial_event_value_seeds_state() {
        let data = IntegrationData::new();
        let info = humidity_info().with_value("48.5");
        let sensor = Arc::new(RfplayerSensor::from_device_info(&info));
        sensor.added_to_hass("sensor.x10_12".into(), &data).unwrap();
        assert_eq!(sensor.state(), Some(48.5));

        let info = DeviceInfo::new(DeviceId::new("X10", "13")).with_value("n/a");
        let sensor = Arc::new(RfplayerSensor::from_device_info(&info));
        sensor.added_to_hass("sensor.x10_13".into(), &data).unwrap();
        assert_eq!(sensor.state(), None);
        assert!(data.entity_lookup.contains("X10_13"));
    }

    #[tokio::test]
    async fn test_set_notifies_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        let sensor = RfplayerSensor::from_device_info(&humidity_info());
        sensor.set_notifier(StateNotifier::new(tx, "sensor.x10_12"));

        sensor.handle_event(&event("55")).unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.entity_id, "sensor.x10_12");
        assert_eq!(change.state, Some(55.0));
        assert_eq!(Some(change.last_updated), sensor.last_updated());
    }
}
