#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Interactive, field-by-field configuration editing over any line-based terminal.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;
use tower_config::{Config, ConfigError};

#[derive(Debug, Error)]
pub enum EditError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Prompts on `W`, reads answers from `R`.
///
/// An empty answer (or end of input) keeps the current value. Answers that
/// fail to parse or fall outside their range are re-asked.
pub struct Editor<R, W> {
    input: R,
    output: W,
    eof: bool,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            eof: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> io::Result<Option<String>> {
        if self.eof {
            return Ok(None);
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Yes/no question; anything but `y`/`yes` is no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} [y/N]: ")?;
        self.output.flush()?;
        Ok(self
            .read_answer()?
            .is_some_and(|a| matches!(a.to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    fn ask<T, F>(&mut self, label: &str, current: T, check: F) -> io::Result<T>
    where
        T: FromStr + Display,
        F: Fn(&T) -> Result<(), String>,
    {
        loop {
            write!(self.output, "{label} [{current}]: ")?;
            self.output.flush()?;
            let Some(answer) = self.read_answer()? else {
                return Ok(current);
            };
            if answer.is_empty() {
                return Ok(current);
            }
            match answer.parse::<T>() {
                Ok(v) => match check(&v) {
                    Ok(()) => return Ok(v),
                    Err(msg) => writeln!(self.output, "  invalid: {msg}")?,
                },
                Err(_) => writeln!(self.output, "  invalid: cannot parse {answer:?}")?,
            }
        }
    }

    fn ask_text(&mut self, label: &str, current: String) -> io::Result<String> {
        self.ask(label, current, |s: &String| {
            if s.is_empty() {
                Err("must not be empty".into())
            } else {
                Ok(())
            }
        })
    }

    /// Walk every configurable value of `cfg`, returning the edited copy.
    ///
    /// The result is validated; `cfg` itself is never modified.
    pub fn edit(&mut self, cfg: &Config) -> Result<Config, EditError> {
        let mut c = cfg.clone();
        writeln!(self.output, "Press enter to keep the value shown in brackets.")?;

        c.measurement = self.ask_text("measurement", c.measurement)?;
        c.tags.tower_name = self.ask_text("tags.towerName", c.tags.tower_name)?;
        c.tags.tower_group = self.ask_text("tags.towerGroup", c.tags.tower_group)?;

        c.db.host_name = self.ask_text("db.host_name", c.db.host_name)?;
        c.db.host_port = self.ask("db.host_port", c.db.host_port, |p: &u16| {
            if *p == 0 {
                Err("must be in [1, 65535]".into())
            } else {
                Ok(())
            }
        })?;
        c.db.dbname = self.ask_text("db.dbname", c.db.dbname)?;
        c.db.username = self.ask_text("db.username", c.db.username)?;
        c.db.ssl = self.ask("db.ssl", c.db.ssl, |_: &bool| Ok(()))?;

        c.arduino.baud_rate = self.ask("arduino.baud_rate", c.arduino.baud_rate, |b: &u32| {
            if *b == 0 {
                Err("must be > 0".into())
            } else {
                Ok(())
            }
        })?;
        c.arduino.serial_port = self.ask_text("arduino.serial_port", c.arduino.serial_port)?;

        self.edit_water_level(&mut c)?;
        self.edit_light_schedule(&mut c)?;

        c.validate()?;
        tracing::debug!("configuration edited");
        Ok(c)
    }

    fn edit_water_level(&mut self, c: &mut Config) -> io::Result<()> {
        let finite = |v: &f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err("must be a finite number".to_string())
            }
        };
        let wl = &mut c.water_level;
        wl.sensor_height = self.ask("water_level.sensor_height", wl.sensor_height, finite)?;
        loop {
            let max = self.ask("water_level.max_water_level", wl.max_water_level, finite)?;
            let min = self.ask("water_level.min_water_level", wl.min_water_level, finite)?;
            if max > min {
                wl.max_water_level = max;
                wl.min_water_level = min;
                return Ok(());
            }
            writeln!(self.output, "  invalid: max_water_level must be > min_water_level")?;
            if self.eof {
                // Nothing more to read; keep the original pair.
                return Ok(());
            }
        }
    }

    fn edit_light_schedule(&mut self, c: &mut Config) -> io::Result<()> {
        let hour = |h: &u8| {
            if *h <= 23 {
                Ok(())
            } else {
                Err("must be in [0, 23]".to_string())
            }
        };
        let minute = |m: &u8| {
            if *m <= 59 {
                Ok(())
            } else {
                Err("must be in [0, 59]".to_string())
            }
        };
        let ls = &mut c.light_sensor;
        ls.expected_start_on_hour =
            self.ask("light_sensor.expected_start_on_hour", ls.expected_start_on_hour, hour)?;
        ls.expected_start_on_min =
            self.ask("light_sensor.expected_start_on_min", ls.expected_start_on_min, minute)?;
        ls.expected_start_off_hour =
            self.ask("light_sensor.expected_start_off_hour", ls.expected_start_off_hour, hour)?;
        ls.expected_start_off_min =
            self.ask("light_sensor.expected_start_off_min", ls.expected_start_off_min, minute)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    const SAMPLE: &str = r#"{
        "measurement": "rhok",
        "tags": { "towerName": "tower-1", "towerGroup": "north" },
        "db": { "host_name": "db.example.org", "host_port": 8086, "dbname": "towers", "username": "bridge" },
        "arduino": { "baud_rate": 9600 },
        "water_level": { "sensor_height": 60.0, "max_water_level": 40.0, "min_water_level": 10.0 },
        "light_sensor": {
            "expected_start_on_hour": 8, "expected_start_on_min": 0,
            "expected_start_off_hour": 20, "expected_start_off_min": 0
        }
    }"#;

    fn sample() -> Config {
        tower_config::from_json_str(SAMPLE).unwrap()
    }

    fn run(input: &str) -> (Config, String) {
        let mut ed = Editor::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let cfg = ed.edit(&sample()).unwrap();
        (cfg, String::from_utf8(ed.into_output()).unwrap())
    }

    #[rstest]
    #[case("y\n", true)]
    #[case("YES\n", true)]
    #[case("n\n", false)]
    #[case("\n", false)]
    #[case("", false)]
    fn confirm_answers(#[case] input: &str, #[case] expected: bool) {
        let mut ed = Editor::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        assert_eq!(ed.confirm("Enter configuration mode?").unwrap(), expected);
    }

    #[test]
    fn empty_input_keeps_everything() {
        let (cfg, _) = run("");
        assert_eq!(cfg, sample());
    }

    #[test]
    fn answers_replace_values_in_order() {
        let input = "tank\ntower-9\n\n\n8087\n\n\nfalse\n115200\n/dev/ttyUSB0\n";
        let (cfg, out) = run(input);
        assert_eq!(cfg.measurement, "tank");
        assert_eq!(cfg.tags.tower_name, "tower-9");
        assert_eq!(cfg.tags.tower_group, "north");
        assert_eq!(cfg.db.host_port, 8087);
        assert!(!cfg.db.ssl);
        assert_eq!(cfg.arduino.baud_rate, 115_200);
        assert_eq!(cfg.serial_port(), "/dev/ttyUSB0");
        assert!(out.contains("measurement [rhok]: "));
    }

    #[test]
    fn bad_answers_are_reasked() {
        // measurement, 2 tags, host_name, then port: "abc", "0", "9000"
        let input = "\n\n\n\nabc\n0\n9000\n";
        let (cfg, out) = run(input);
        assert_eq!(cfg.db.host_port, 9000);
        assert!(out.contains("cannot parse \"abc\""));
        assert!(out.contains("must be in [1, 65535]"));
    }

    #[test]
    fn water_levels_must_keep_max_above_min() {
        // skip 10 prompts before the water-level block
        let mut input = "\n".repeat(10);
        input.push_str("\n5\n20\n50\n20\n");
        let (cfg, out) = run(&input);
        assert!(out.contains("max_water_level must be > min_water_level"));
        assert_eq!(cfg.water_level.max_water_level, 50.0);
        assert_eq!(cfg.water_level.min_water_level, 20.0);
    }

    #[test]
    fn light_hours_are_range_checked() {
        let mut input = "\n".repeat(13);
        input.push_str("24\n7\n");
        let (cfg, out) = run(&input);
        assert!(out.contains("must be in [0, 23]"));
        assert_eq!(cfg.light_sensor.expected_start_on_hour, 7);
    }
}
