//! Shared tables scoped to one integration instance.
//!
//! Both tables are injected into the setup code and the event router; they
//! are created with the integration and dropped with it.

use crate::device::DeviceInfo;
use crate::sensors::RfplayerSensor;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Composite device id -> live sensor entity.
#[derive(Default)]
pub struct EntityLookup {
    entities: RwLock<HashMap<String, Arc<RfplayerSensor>>>,
}

impl EntityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an entity. Replaces whatever was registered under `id`.
    pub fn insert(&self, id: impl Into<String>, entity: Arc<RfplayerSensor>) {
        self.entities.write().insert(id.into(), entity);
    }

    pub fn get(&self, id: &str) -> Option<Arc<RfplayerSensor>> {
        self.entities.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.entities.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Event category -> discovery channel for new devices of that category.
#[derive(Default)]
pub struct DeviceRegister {
    channels: RwLock<HashMap<String, mpsc::Sender<DeviceInfo>>>,
}

impl DeviceRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route new devices of `category` to `tx`.
    pub fn arm(&self, category: impl Into<String>, tx: mpsc::Sender<DeviceInfo>) {
        let category = category.into();
        debug!("Discovery armed for category {}", category);
        self.channels.write().insert(category, tx);
    }

    /// Stop routing new devices of `category`. Returns whether it was armed.
    pub fn disarm(&self, category: &str) -> bool {
        self.channels.write().remove(category).is_some()
    }

    pub fn sender(&self, category: &str) -> Option<mpsc::Sender<DeviceInfo>> {
        self.channels.read().get(category).cloned()
    }

    pub fn is_armed(&self, category: &str) -> bool {
        self.channels.read().contains_key(category)
    }
}

/// Per-integration shared state.
#[derive(Default)]
pub struct IntegrationData {
    pub entity_lookup: EntityLookup,
    pub device_register: DeviceRegister,
}

impl IntegrationData {
    pub fn new() -> Self {
        Self::default()
    }
}
