//! Sensor platform setup for one config entry.
//!
//! Creates the jamming entity and the statically configured sensors, then
//! (when automatic add is on) arms discovery for new sensor-kind devices.
//! Discovery is armed strictly after the initial entities are registered, so
//! no discovered device can race the initial batch.

use crate::config::{Config, ConfigEntry};
use crate::device::{DeviceInfo, EVENT_KEY_SENSOR};
use crate::error::Result;
use crate::platform::{AddEntities, IntegrationData};
use crate::sensors::RfplayerSensor;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Running sensor platform of one config entry.
pub struct SensorPlatformHandle {
    data: Arc<IntegrationData>,
    cancel: CancellationToken,
    discovery: Option<JoinHandle<()>>,
}

impl SensorPlatformHandle {
    pub fn discovery_enabled(&self) -> bool {
        self.discovery.is_some()
    }

    /// Disarm discovery and wait for the discovery task to stop.
    pub async fn unload(self) {
        self.data.device_register.disarm(EVENT_KEY_SENSOR);
        self.cancel.cancel();
        if let Some(task) = self.discovery
            && let Err(e) = task.await
        {
            error!("Discovery task failed: {}", e);
        }
        info!("Sensor platform unloaded");
    }
}

/// Set up the sensor platform for `entry`.
pub async fn setup_entry(
    entry: &ConfigEntry,
    config: &Config,
    data: Arc<IntegrationData>,
    platform: Arc<dyn AddEntities>,
) -> Result<SensorPlatformHandle> {
    let jamming = Arc::new(RfplayerSensor::jamming());
    let mut configured = HashSet::from([jamming.unique_id()]);
    platform.add_entities(vec![jamming]).await?;

    for raw in entry.sensor_devices() {
        let device = match DeviceInfo::try_from(raw.clone()) {
            Ok(device) => device,
            Err(e) => {
                warn!("Skipping configured device: {}", e);
                continue;
            }
        };
        if !configured.insert(device.id.composite()) {
            warn!("Skipping duplicate configured device {}", device.id);
            continue;
        }
        add_new_device(platform.as_ref(), device).await?;
    }

    let cancel = CancellationToken::new();
    let discovery = if entry.automatic_add(config.automatic_add) {
        let (tx, rx) = mpsc::channel(config.event_buffer);
        data.device_register.arm(EVENT_KEY_SENSOR, tx);
        Some(tokio::spawn(run_discovery(
            rx,
            configured,
            data.clone(),
            platform,
            cancel.clone(),
        )))
    } else {
        None
    };

    info!(
        "Sensor platform ready: {} entities, automatic add {}",
        data.entity_lookup.len(),
        if discovery.is_some() { "on" } else { "off" }
    );

    Ok(SensorPlatformHandle {
        data,
        cancel,
        discovery,
    })
}

async fn add_new_device(platform: &dyn AddEntities, device: DeviceInfo) -> Result<()> {
    debug!("Add sensor entity {}", device.id);
    let sensor = Arc::new(RfplayerSensor::from_device_info(&device));
    platform.add_entities(vec![sensor]).await
}

/// Create an entity for every newly observed sensor-kind device.
///
/// Devices that are configured statically or already have an entity are
/// not registered again; a value they carry goes to the existing entity.
async fn run_discovery(
    mut rx: mpsc::Receiver<DeviceInfo>,
    configured: HashSet<String>,
    data: Arc<IntegrationData>,
    platform: Arc<dyn AddEntities>,
    cancel: CancellationToken,
) {
    loop {
        let device = tokio::select! {
            _ = cancel.cancelled() => break,
            device = rx.recv() => match device {
                Some(device) => device,
                None => break,
            },
        };

        let id = device.id.composite();
        if let Some(existing) = data.entity_lookup.get(&id) {
            debug!("Ignoring discovery of known device {}", id);
            if device.value.is_some()
                && let Err(e) = existing.handle_event(&device)
            {
                warn!("Dropping event for {}: {}", id, e);
            }
            continue;
        }
        if configured.contains(&id) {
            debug!("Ignoring discovery of configured device {}", id);
            continue;
        }

        if let Err(e) = add_new_device(platform.as_ref(), device).await {
            error!("Failed to add sensor {}: {}", id, e);
        }
    }
    debug!("Sensor discovery stopped");
}
