//! Minimal in-process host platform.
//!
//! Stands in for the automation host: assigns entity ids, wires the state
//! notifier and attaches each entity, which then registers itself in the
//! entity lookup.

use super::IntegrationData;
use crate::error::{Result, RfplayerError};
use crate::sensors::{NotifiableSensor, RfplayerSensor, StateChange, StateNotifier};
use async_trait::async_trait;
use log::info;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the state change broadcast.
const STATE_CHANNEL_CAPACITY: usize = 256;

/// The host's bulk "add entities" primitive.
#[async_trait]
pub trait AddEntities: Send + Sync {
    async fn add_entities(&self, entities: Vec<Arc<RfplayerSensor>>) -> Result<()>;
}

pub struct HostPlatform {
    data: Arc<IntegrationData>,
    entities: RwLock<Vec<Arc<RfplayerSensor>>>,
    entity_ids: RwLock<HashSet<String>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl HostPlatform {
    pub fn new(data: Arc<IntegrationData>) -> Self {
        let (state_tx, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            data,
            entities: RwLock::new(Vec::new()),
            entity_ids: RwLock::new(HashSet::new()),
            state_tx,
        }
    }

    /// Entities added so far, in insertion order.
    pub fn entities(&self) -> Vec<Arc<RfplayerSensor>> {
        self.entities.read().clone()
    }

    /// Receive state changes of every entity added to this platform.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Reserve a free `sensor.<slug>` entity id for `entity`.
    fn allocate_entity_id(&self, entity: &RfplayerSensor) -> String {
        let base = format!(
            "sensor.{}",
            slugify(entity.name().map_or_else(|| entity.unique_id(), String::from).as_str())
        );

        let mut ids = self.entity_ids.write();
        let mut candidate = base.clone();
        let mut suffix = 2;
        while ids.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        ids.insert(candidate.clone());
        candidate
    }
}

#[async_trait]
impl AddEntities for HostPlatform {
    /// Attach every entity of the batch, or none of them.
    async fn add_entities(&self, entities: Vec<Arc<RfplayerSensor>>) -> Result<()> {
        {
            let mut seen = HashSet::new();
            for entity in &entities {
                if let Some(entity_id) = entity.entity_id() {
                    return Err(RfplayerError::AlreadyAdded(entity_id.to_string()));
                }
                if !seen.insert(Arc::as_ptr(entity)) {
                    return Err(RfplayerError::AlreadyAdded(entity.unique_id()));
                }
            }
        }

        for entity in entities {
            let entity_id = self.allocate_entity_id(&entity);
            entity.set_notifier(StateNotifier::new(self.state_tx.clone(), entity_id.clone()));
            if let Err(e) = entity.added_to_hass(entity_id.clone(), &self.data) {
                self.entity_ids.write().remove(&entity_id);
                return Err(e);
            }
            info!(
                "Added entity {} ({}, unit: {})",
                entity_id,
                entity.unique_id(),
                entity.unit_of_measurement().unwrap_or("-")
            );
            self.entities.write().push(entity);
        }
        Ok(())
    }
}

/// Lowercase, non-alphanumerics collapsed to single `_`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug.to_string()
    }
}
