//! Host-side seams of the sensor platform.
//!
//! [`IntegrationData`] holds the per-integration shared tables (entity lookup
//! and device register). [`AddEntities`] is the host's "add entities"
//! primitive, implemented in-process by [`HostPlatform`].

pub mod data;
pub mod entity_platform;

pub use data::{DeviceRegister, EntityLookup, IntegrationData};
pub use entity_platform::{AddEntities, HostPlatform};
