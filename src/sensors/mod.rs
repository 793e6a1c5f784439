//! Sensor entities backed by RFPlayer device events.
//!
//! All sensors implement the [`Sensor`] trait which provides version tracking
//! for change detection. Sensors that push their changes to the host also
//! implement [`NotifiableSensor`].

pub mod notifier;
pub mod rfplayer_sensor;
pub mod units;

pub use notifier::{StateChange, StateNotifier};
pub use rfplayer_sensor::{JAMMING_PROTOCOL, RfplayerSensor};
pub use units::{SensorType, lookup_unit_for_sensor_type};

/// Trait for sensors with change detection.
///
/// The version number is incremented each time a new value is stored, even
/// when the value itself is unchanged.
pub trait Sensor: Send + Sync {
    /// Get the current version number.
    fn version(&self) -> u32;
}

/// Trait for sensors that push state changes to the host.
pub trait NotifiableSensor: Sensor {
    /// Set the notifier for this sensor.
    ///
    /// Called by the host platform when the entity is added, before the
    /// entity registers itself in the entity lookup.
    fn set_notifier(&self, notifier: StateNotifier);
}
