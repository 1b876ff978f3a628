use rstest::rstest;
use serde_json::{Value, json};
use tower_config::{ConfigError, from_json_str, from_value};

fn valid() -> Value {
    json!({
        "measurement": "rhok",
        "tags": { "towerName": "tower-1", "towerGroup": "north" },
        "db": { "host_name": "db.example.org", "host_port": 8086, "dbname": "towers", "username": "bridge" },
        "arduino": { "baud_rate": 9600 },
        "water_level": { "sensor_height": 60.0, "max_water_level": 40.0, "min_water_level": 10.0 },
        "light_sensor": {
            "expected_start_on_hour": 8, "expected_start_on_min": 0,
            "expected_start_off_hour": 20, "expected_start_off_min": 0
        }
    })
}

#[test]
fn accepts_minimal_config() {
    let cfg = from_value(valid()).expect("valid config should pass");
    assert_eq!(cfg.measurement(), "rhok");
    assert_eq!(cfg.baud_rate(), 9600);
    assert_eq!(cfg.light_schedule().expected_on(), (8, 0));
    assert_eq!(cfg.light_schedule().expected_off(), (20, 0));
    assert_eq!(cfg.water_level().sensor_height, 60.0);
}

#[test]
fn reports_every_missing_key() {
    let mut v = valid();
    let obj = v.as_object_mut().unwrap();
    obj.remove("db");
    obj.remove("light_sensor");
    match from_value(v) {
        Err(ConfigError::MissingKeys(keys)) => assert_eq!(keys, vec!["db", "light_sensor"]),
        other => panic!("expected MissingKeys, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_not_a_missing_key() {
    let err = from_json_str("{ not json").expect_err("should reject");
    assert!(matches!(err, ConfigError::Malformed(_)));
}

#[rstest]
#[case("/light_sensor/expected_start_on_hour", json!(24), "must be in [0, 23]")]
#[case("/light_sensor/expected_start_off_hour", json!(99), "must be in [0, 23]")]
#[case("/light_sensor/expected_start_on_min", json!(60), "must be in [0, 59]")]
#[case("/light_sensor/expected_start_off_min", json!(75), "must be in [0, 59]")]
#[case("/water_level/max_water_level", json!(10.0), "max_water_level must be >")]
#[case("/water_level/min_water_level", json!(45.0), "max_water_level must be >")]
#[case("/arduino/baud_rate", json!(0), "baud_rate must be > 0")]
#[case("/db/host_port", json!(0), "host_port")]
#[case("/measurement", json!(""), "measurement must not be empty")]
#[case("/tags/towerName", json!("  "), "towerName must not be empty")]
fn rejects_out_of_range_values(
    #[case] pointer: &str,
    #[case] value: Value,
    #[case] needle: &str,
) {
    let mut v = valid();
    *v.pointer_mut(pointer).unwrap() = value;
    let err = from_value(v).expect_err("should reject");
    assert!(
        matches!(err, ConfigError::Invalid(_)),
        "unexpected error kind: {err:?}"
    );
    assert!(format!("{err}").contains(needle), "{err} lacks {needle}");
}

#[test]
fn rejects_wrong_types_as_invalid() {
    let mut v = valid();
    v["light_sensor"]["expected_start_on_hour"] = json!("eight");
    assert!(matches!(from_value(v), Err(ConfigError::Invalid(_))));
}

#[rstest]
#[case(json!([]), "at least one field")]
#[case(json!(["pH", "pH"]), "duplicate name 'pH'")]
#[case(json!(["pH", ""]), "empty names")]
fn rejects_bad_field_override(#[case] fields: Value, #[case] needle: &str) {
    let mut v = valid();
    v["fields"] = fields;
    let err = from_value(v).expect_err("should reject");
    assert!(format!("{err}").contains(needle), "{err} lacks {needle}");
}

#[test]
fn rejects_unknown_rotation() {
    let mut v = valid();
    v["logging"] = json!({ "rotation": "weekly" });
    let err = from_value(v).expect_err("should reject");
    assert!(format!("{err}").contains("never|hourly|daily"));
}
