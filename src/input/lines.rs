//! Newline-delimited JSON event source.
//!
//! Each line holds one device-info record, e.g.
//! `{"id": "X10_12", "sensor": "humidity", "value": "55"}`.
//! Blank lines and lines starting with `#` are skipped.

use super::{EventRouter, Routed};
use crate::device::DeviceInfo;
use crate::error::Result;
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Route every record read from `reader` until EOF.
///
/// Malformed records are logged and skipped. Returns the number of records
/// that reached a consumer.
pub async fn run_line_source<R>(reader: R, router: &EventRouter) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut delivered = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let device = match DeviceInfo::from_json(line) {
            Ok(device) => device,
            Err(e) => {
                warn!("Skipping malformed record: {}", e);
                continue;
            }
        };

        if router.route(device).await != Routed::Ignored {
            delivered += 1;
        }
    }

    info!("Event source closed after {} delivered record(s)", delivered);
    Ok(delivered)
}
