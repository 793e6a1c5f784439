//! Event input for the sensor platform.
//!
//! - `router`: hands device-info records to known entities or to discovery
//! - `lines`: newline-delimited JSON event source (stdin in the binary)

pub mod lines;
pub mod router;

pub use lines::run_line_source;
pub use router::{EventRouter, Routed};
