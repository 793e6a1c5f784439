//! RFPlayer sensor platform.
//!
//! Registers sensor entities (temperature, humidity, battery, jamming
//! detection) for devices seen by an RFPlayer RF receiver and keeps their
//! latest values for the host automation framework.

pub mod config;
pub mod device;
pub mod error;
pub mod input;
pub mod platform;
pub mod rflib;
pub mod sensors;
pub mod setup;
