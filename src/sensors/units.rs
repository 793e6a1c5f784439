//! Sensor types and their units of measurement.

use crate::rflib::{PACKET_FIELDS, unit_for_field};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Kinds of sensors exposed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
    #[strum(to_string = "battery", serialize = "battery_level")]
    Battery,
    Jamming,
}

impl SensorType {
    /// Canonical packet field name carrying this sensor's reading.
    pub fn field_name(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Battery => "battery_level",
            SensorType::Jamming => "jamming",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SensorType::Temperature => "mdi:thermometer",
            SensorType::Humidity => "mdi:water-percent",
            SensorType::Battery => "mdi:battery",
            SensorType::Jamming => "mdi:access-point",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        lookup_unit_for_sensor_type(self.field_name())
    }
}

/// Get the unit for a sensor type label (a canonical packet field name).
///
/// Inverts the parser's field table to find the field abbreviation, then
/// looks that up in the units table. Unknown labels yield `None`.
pub fn lookup_unit_for_sensor_type(sensor_type: &str) -> Option<&'static str> {
    let field_abbrev = PACKET_FIELDS
        .iter()
        .map(|(abbrev, name)| (*name, *abbrev))
        .collect::<std::collections::HashMap<_, _>>();

    field_abbrev
        .get(sensor_type)
        .and_then(|abbrev| unit_for_field(abbrev))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rflib::UNITS;
    use strum::IntoEnumIterator;

    #[test]
    fn test_known_types_match_units_table() {
        for (abbrev, name) in PACKET_FIELDS {
            let expected = UNITS.iter().find(|(a, _)| a == abbrev).map(|(_, u)| *u);
            assert_eq!(lookup_unit_for_sensor_type(name), expected, "{name}");
        }
    }

    #[test]
    fn test_common_units() {
        assert_eq!(lookup_unit_for_sensor_type("temperature"), Some("°C"));
        assert_eq!(lookup_unit_for_sensor_type("humidity"), Some("%"));
        assert_eq!(lookup_unit_for_sensor_type("battery_level"), Some("%"));
    }

    #[test]
    fn test_unknown_type_has_no_unit() {
        assert_eq!(lookup_unit_for_sensor_type("luminosity"), None);
        assert_eq!(lookup_unit_for_sensor_type(""), None);
        // Abbreviations are not sensor types.
        assert_eq!(lookup_unit_for_sensor_type("tem"), None);
        // Known field without a unit.
        assert_eq!(lookup_unit_for_sensor_type("command"), None);
    }

    #[test]
    fn test_sensor_type_labels() {
        assert_eq!("temperature".parse::<SensorType>(), Ok(SensorType::Temperature));
        assert_eq!("battery".parse::<SensorType>(), Ok(SensorType::Battery));
        assert_eq!("battery_level".parse::<SensorType>(), Ok(SensorType::Battery));
        assert!("switch".parse::<SensorType>().is_err());
        assert_eq!(SensorType::Battery.to_string(), "battery");
        assert_eq!(SensorType::Humidity.as_ref(), "humidity");
    }

    #[test]
    fn test_sensor_type_units_and_icons() {
        assert_eq!(SensorType::Temperature.unit(), Some("°C"));
        assert_eq!(SensorType::Battery.unit(), Some("%"));
        assert_eq!(SensorType::Jamming.unit(), None);
        assert_eq!(SensorType::Temperature.icon(), "mdi:thermometer");
        assert_eq!(SensorType::Humidity.icon(), "mdi:water-percent");
        assert_eq!(SensorType::Battery.icon(), "mdi:battery");
        assert_eq!(SensorType::Jamming.icon(), "mdi:access-point");
        for sensor_type in SensorType::iter() {
            assert!(sensor_type.icon().starts_with("mdi:"));
        }
    }
}
