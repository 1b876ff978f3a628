//! Positional record schema emitted by the tower microcontroller.
//!
//! The device sends values by position, never by name, so this order is a
//! wire contract. Bump `SCHEMA_VERSION` whenever it changes.

pub const SCHEMA_VERSION: u32 = 1;

pub const F_WATER_LEVEL: &str = "water_level";
pub const F_AIR_HUMIDITY: &str = "air_humidity";
pub const F_AIR_TEMP: &str = "air_temp";
pub const F_WATER_TEMP: &str = "water_temp";
pub const F_PH: &str = "pH";
pub const F_LIGHT_STATUS_1: &str = "light_status_1";
pub const F_LIGHT_STATUS_2: &str = "light_status_2";
pub const F_LIGHT_STATUS_3: &str = "light_status_3";
pub const F_LIGHT_STATUS_4: &str = "light_status_4";

/// Field names in device emission order (schema v1).
pub const FIELD_ORDER: [&str; 9] = [
    F_WATER_LEVEL,
    F_AIR_HUMIDITY,
    F_AIR_TEMP,
    F_WATER_TEMP,
    F_PH,
    F_LIGHT_STATUS_1,
    F_LIGHT_STATUS_2,
    F_LIGHT_STATUS_3,
    F_LIGHT_STATUS_4,
];

pub const FIELDS_LEN: usize = FIELD_ORDER.len();

/// Token the device sends for a position with no physical sensor behind it.
pub const NOT_APPLICABLE: &str = "x";

/// Raw light-sensor value meaning "light detected".
pub const LIGHT_ON: i64 = 1;
/// Raw light-sensor value meaning "no light detected".
pub const LIGHT_OFF: i64 = 0;

pub fn is_light_field(name: &str) -> bool {
    name.starts_with("light_status_")
}
