//! Human-readable error descriptions, exit codes and structured JSON error formatting.

use tower_config::ConfigError;
use tower_core::BridgeError;

pub const EXIT_UNCLASSIFIED: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_DEVICE_UNAVAILABLE: i32 = 3;
pub const EXIT_DATABASE_UNAVAILABLE: i32 = 4;
pub const EXIT_DEVICE_DISCONNECTED: i32 = 5;

fn bridge_error(err: &eyre::Report) -> Option<BridgeError> {
    if let Some(be) = err.downcast_ref::<BridgeError>() {
        return Some(be.clone());
    }
    err.downcast_ref::<ConfigError>()
        .map(|ce| BridgeError::ConfigInvalid(ce.to_string()))
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = bridge_error(err) {
        return match be {
            BridgeError::ConfigMissing(keys) => format!(
                "What happened: The configuration is missing required keys: {}.\nLikely causes: An incomplete or hand-edited config file.\nHow to fix: Add the keys (measurement, tags, db, arduino, water_level, light_sensor) and rerun.",
                keys.join(", ")
            ),
            BridgeError::ConfigInvalid(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Unreadable file, malformed JSON, or out-of-range values.\nHow to fix: Fix the config file (or pass --config), then rerun."
            ),
            BridgeError::DeviceUnavailable(msg) => format!(
                "What happened: The sensor device could not be opened ({msg}).\nLikely causes: Wrong serial port, board unplugged, or missing permission on the tty.\nHow to fix: Check `ls /dev/tty*`, set arduino.serial_port or pass --port, and make sure the user is in the dialout group."
            ),
            BridgeError::DatabaseUnavailable(msg) => format!(
                "What happened: The database did not answer ({msg}).\nLikely causes: Wrong db.host_name/db.host_port, network down, or ssl mismatch.\nHow to fix: Verify the server is reachable, or use --dry-run to test without it."
            ),
            BridgeError::DeviceDisconnected(msg) => format!(
                "What happened: The sensor device stopped responding ({msg}).\nLikely causes: USB cable pulled or board reset.\nHow to fix: Reconnect the board and restart the bridge."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match bridge_error(err) {
        Some(BridgeError::ConfigMissing(_) | BridgeError::ConfigInvalid(_)) => EXIT_CONFIG,
        Some(BridgeError::DeviceUnavailable(_)) => EXIT_DEVICE_UNAVAILABLE,
        Some(BridgeError::DatabaseUnavailable(_)) => EXIT_DATABASE_UNAVAILABLE,
        Some(BridgeError::DeviceDisconnected(_)) => EXIT_DEVICE_DISCONNECTED,
        _ => EXIT_UNCLASSIFIED,
    }
}

fn reason_name(be: &BridgeError) -> &'static str {
    match be {
        BridgeError::ConfigMissing(_) => "ConfigMissing",
        BridgeError::ConfigInvalid(_) => "ConfigInvalid",
        BridgeError::DeviceUnavailable(_) => "DeviceUnavailable",
        BridgeError::DatabaseUnavailable(_) => "DatabaseUnavailable",
        BridgeError::ShapeMismatch { .. } => "ShapeMismatch",
        BridgeError::FieldParse { .. } => "FieldParse",
        BridgeError::WriteFailure(_) => "WriteFailure",
        BridgeError::DeviceDisconnected(_) => "DeviceDisconnected",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = bridge_error(err).map_or("Error", |be| reason_name(&be));
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
