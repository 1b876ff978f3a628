use std::io::Write;

use tower_traits::{MeasurementRecord, PointSink};

/// Writes each batch as one JSON array per line. Used for dry runs.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PointSink for JsonLinesSink<W> {
    fn write_points(
        &mut self,
        points: &[MeasurementRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        serde_json::to_writer(&mut self.out, points)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tower_traits::FieldValue;

    #[test]
    fn one_array_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let mut rec = MeasurementRecord::new("rhok", BTreeMap::new());
        rec.fields.insert("pH".into(), FieldValue::Float(7.0));
        sink.write_points(std::slice::from_ref(&rec)).unwrap();
        sink.write_points(&[rec]).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v[0]["measurement"], "rhok");
        assert_eq!(v[0]["fields"]["pH"], 7.0);
    }
}
