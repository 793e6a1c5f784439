//! Device-info records delivered by the RFPlayer event source.

pub mod device_info;

pub use device_info::{DeviceId, DeviceInfo, EVENT_KEY_SENSOR, EventValue, RawDeviceInfo};
