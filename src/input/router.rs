//! Routes device-info records to their consumer.
//!
//! Records of devices that already have an entity update that entity.
//! Records of unknown sensor-kind devices go to the discovery channel armed
//! for the `sensor` category, if any. Everything else is dropped.

use crate::device::{DeviceInfo, EVENT_KEY_SENSOR};
use crate::platform::IntegrationData;
use log::{debug, warn};
use std::sync::Arc;

/// What happened to a routed record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routed {
    /// A known entity stored the value.
    Updated(f64),
    /// A known entity rejected the record (missing or invalid value).
    Rejected,
    /// Handed to discovery.
    Discovered,
    /// No consumer.
    Ignored,
}

pub struct EventRouter {
    data: Arc<IntegrationData>,
}

impl EventRouter {
    pub fn new(data: Arc<IntegrationData>) -> Self {
        Self { data }
    }

    pub async fn route(&self, device: DeviceInfo) -> Routed {
        let id = device.id.composite();

        if let Some(entity) = self.data.entity_lookup.get(&id) {
            return match entity.handle_event(&device) {
                Ok(value) => {
                    debug!("{} = {}", id, value);
                    Routed::Updated(value)
                }
                Err(e) => {
                    warn!("Dropping event for {}: {}", id, e);
                    Routed::Rejected
                }
            };
        }

        if !device.is_sensor() {
            debug!("Ignoring event for unknown device {}", id);
            return Routed::Ignored;
        }

        let Some(tx) = self.data.device_register.sender(EVENT_KEY_SENSOR) else {
            debug!("Automatic add is off, ignoring new sensor {}", id);
            return Routed::Ignored;
        };
        match tx.send(device).await {
            Ok(()) => Routed::Discovered,
            Err(_) => {
                warn!("Discovery channel closed, ignoring new sensor {}", id);
                Routed::Ignored
            }
        }
    }
}
