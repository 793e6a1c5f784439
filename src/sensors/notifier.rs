//! State change notifier for live host updates.
//!
//! When a sensor stores a new value it pushes a [`StateChange`] to whoever
//! subscribed on the host side, so the host does not have to poll.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// A new value written by a sensor entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub entity_id: String,
    pub state: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

/// Pushes state changes of one entity to the host's subscribers.
///
/// # Usage
/// ```ignore
/// // In the sensor's set() method:
/// if let Some(notifier) = self.notifier.read().as_ref() {
///     notifier.notify(Some(value), now);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StateNotifier {
    tx: broadcast::Sender<StateChange>,
    entity_id: String,
}

impl StateNotifier {
    /// Create a notifier for the entity `entity_id`.
    pub fn new(tx: broadcast::Sender<StateChange>, entity_id: impl Into<String>) -> Self {
        Self {
            tx,
            entity_id: entity_id.into(),
        }
    }

    /// Get the entity ID this notifier is configured for.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Publish a state change.
    ///
    /// Non-blocking. Changes published while nobody is subscribed are dropped.
    pub fn notify(&self, state: Option<f64>, last_updated: DateTime<Utc>) {
        let _ = self.tx.send(StateChange {
            entity_id: self.entity_id.clone(),
            state,
            last_updated,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_reaches_subscriber() {
        let (tx, mut rx) = broadcast::channel(4);
        let notifier = StateNotifier::new(tx, "sensor.x10_12");
        let now = Utc::now();

        notifier.notify(Some(55.0), now);

        let change = rx.recv().await.unwrap();
        assert_eq!(change.entity_id, "sensor.x10_12");
        assert_eq!(change.state, Some(55.0));
        assert_eq!(change.last_updated, now);
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        let notifier = StateNotifier::new(tx, "sensor.jamming_detection");
        notifier.notify(None, Utc::now());
        assert_eq!(notifier.entity_id(), "sensor.jamming_detection");
    }
}
