//! InfluxDB line protocol encoding.
//!
//! Records carry no timestamp; the server stamps points on arrival.

use std::fmt::Write as _;

use tower_traits::{FieldValue, MeasurementRecord};

fn escape_into(out: &mut String, s: &str, specials: &[char]) {
    for c in s.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

fn push_field_value(out: &mut String, v: &FieldValue) {
    match v {
        FieldValue::Float(_) => {
            let _ = write!(out, "{v}");
        }
        FieldValue::Text(s) => {
            out.push('"');
            escape_into(out, s, &['"']);
            out.push('"');
        }
    }
}

/// One line for `record`, or `None` when it has no fields (the server
/// rejects such points).
pub fn encode(record: &MeasurementRecord) -> Option<String> {
    if record.fields.is_empty() {
        return None;
    }
    let mut out = String::new();
    escape_into(&mut out, &record.measurement, &[',', ' ']);
    for (k, v) in &record.tags {
        if v.is_empty() {
            continue;
        }
        out.push(',');
        escape_into(&mut out, k, &[',', '=', ' ']);
        out.push('=');
        escape_into(&mut out, v, &[',', '=', ' ']);
    }
    out.push(' ');
    for (i, (k, v)) in record.fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(&mut out, k, &[',', '=', ' ']);
        out.push('=');
        push_field_value(&mut out, v);
    }
    Some(out)
}

/// Newline-joined body for a batch, skipping records without fields.
pub fn encode_batch(records: &[MeasurementRecord]) -> String {
    records
        .iter()
        .filter_map(encode)
        .collect::<Vec<_>>()
        .join("\n")
}
