//! Packet field tables of the RFPlayer frame parser.
//!
//! The receiver reports decoded frames with abbreviated field names. These
//! tables map the abbreviations to their canonical names and to the physical
//! unit of the measured quantity. They are read-only.

pub mod fields;

pub use fields::{PACKET_FIELDS, UNITS, field_name, unit_for_field};
