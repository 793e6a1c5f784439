use crate::device::RawDeviceInfo;
use crate::error::{Result, RfplayerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
///
/// Must run before any other thread is started.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let mut value = value.trim();

            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            // Env vars already set take precedence
            if std::env::var(key).is_err() {
                // SAFETY: only called at the top of main, before the tokio runtime is built
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

/// Process-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding the config entry.
    pub entry_path: PathBuf,
    /// Global default for automatic device discovery.
    pub automatic_add: bool,
    /// Capacity of the discovery channel.
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_path: dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rfplayer")
                .join("entry.json"),
            automatic_add: true,
            event_buffer: 64,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("RFPLAYER_ENTRY_FILE") {
            config.entry_path = PathBuf::from(path);
        }
        if let Ok(automatic_add) = std::env::var("RFPLAYER_AUTOMATIC_ADD")
            && let Some(a) = parse_bool(&automatic_add)
        {
            config.automatic_add = a;
        }
        if let Ok(buffer) = std::env::var("RFPLAYER_EVENT_BUFFER")
            && let Ok(b) = buffer.parse::<usize>()
            && b > 0
        {
            config.event_buffer = b;
        }

        config
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Persisted configuration of one integration instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigEntry {
    #[serde(default)]
    pub data: EntryData,
    #[serde(default)]
    pub options: EntryOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryData {
    #[serde(default)]
    pub automatic_add: Option<bool>,
    /// Known devices keyed by their entry name.
    #[serde(default)]
    pub devices: BTreeMap<String, RawDeviceInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default)]
    pub automatic_add: Option<bool>,
}

impl ConfigEntry {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RfplayerError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| RfplayerError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Whether new devices are added automatically.
    ///
    /// The entry option wins over the entry data, which wins over `default`.
    pub fn automatic_add(&self, default: bool) -> bool {
        self.options
            .automatic_add
            .or(self.data.automatic_add)
            .unwrap_or(default)
    }

    /// Configured devices carrying the sensor marker.
    pub fn sensor_devices(&self) -> impl Iterator<Item = &RawDeviceInfo> {
        self.data.devices.values().filter(|d| d.sensor.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"{
        "data": {
            "automatic_add": false,
            "devices": {
                "protocol_device": {"id": "X10_12", "unit": "%", "sensor": true},
                "switch_device": {"id": "X10_40"}
            }
        },
        "options": {}
    }"#;

    #[test]
    fn test_parse_entry() {
        let entry = ConfigEntry::from_json(ENTRY).unwrap();
        assert_eq!(entry.data.devices.len(), 2);
        let sensors: Vec<_> = entry.sensor_devices().collect();
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].id, "X10_12");
        assert_eq!(sensors[0].unit.as_deref(), Some("%"));
    }

    #[test]
    fn test_automatic_add_resolution() {
        let mut entry = ConfigEntry::from_json(ENTRY).unwrap();
        assert!(!entry.automatic_add(true));

        entry.options.automatic_add = Some(true);
        assert!(entry.automatic_add(false));

        let empty = ConfigEntry::default();
        assert!(empty.automatic_add(true));
        assert!(!empty.automatic_add(false));
    }

    #[test]
    fn test_missing_sections_default() {
        let entry = ConfigEntry::from_json("{}").unwrap();
        assert!(entry.data.devices.is_empty());
        assert_eq!(entry.data.automatic_add, None);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigEntry::load(Path::new("/nonexistent/rfplayer/entry.json"));
        assert!(matches!(result, Err(RfplayerError::ConfigLoad { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" Off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
