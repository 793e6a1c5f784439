/// Abbreviated packet field -> canonical field name.
pub const PACKET_FIELDS: &[(&str, &str)] = &[
    ("bat", "battery_level"),
    ("cmd", "command"),
    ("dtc", "detector"),
    ("fw", "firmware"),
    ("hu", "humidity"),
    ("id", "id"),
    ("jam", "jamming"),
    ("p", "protocol"),
    ("rr", "rain_rate"),
    ("rt", "rain_total"),
    ("tem", "temperature"),
    ("uv", "uv_index"),
    ("val", "value"),
    ("wd", "wind_direction"),
    ("ws", "wind_speed"),
];

/// Abbreviated packet field -> unit of measurement.
///
/// Fields without a physical unit are absent.
pub const UNITS: &[(&str, &str)] = &[
    ("bat", "%"),
    ("hu", "%"),
    ("rr", "mm/h"),
    ("rt", "mm"),
    ("tem", "°C"),
    ("wd", "°"),
    ("ws", "m/s"),
];

/// Canonical name of an abbreviated field.
pub fn field_name(abbrev: &str) -> Option<&'static str> {
    PACKET_FIELDS
        .iter()
        .find(|(key, _)| *key == abbrev)
        .map(|(_, name)| *name)
}

/// Unit of an abbreviated field, if it has one.
pub fn unit_for_field(abbrev: &str) -> Option<&'static str> {
    UNITS
        .iter()
        .find(|(key, _)| *key == abbrev)
        .map(|(_, unit)| *unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let names: HashSet<_> = PACKET_FIELDS.iter().map(|(_, name)| *name).collect();
        assert_eq!(names.len(), PACKET_FIELDS.len());
    }

    #[test]
    fn test_every_unit_has_a_field() {
        for (abbrev, _) in UNITS {
            assert!(field_name(abbrev).is_some(), "no field for {abbrev}");
        }
    }

    #[test]
    fn test_lookups() {
        assert_eq!(field_name("tem"), Some("temperature"));
        assert_eq!(unit_for_field("hu"), Some("%"));
        assert_eq!(unit_for_field("cmd"), None);
        assert_eq!(field_name("nope"), None);
    }
}
