//! Test and helper doubles for the bridge runner.

use std::collections::VecDeque;

use tower_traits::{LineSource, MeasurementRecord, PointSink, ReadOutcome};

/// A source that replays a fixed script, then reports `Closed`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<ReadOutcome, String>>,
}

impl ScriptedSource {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: lines
                .into_iter()
                .map(|l| Ok(ReadOutcome::Line(l.into())))
                .collect(),
        }
    }

    pub fn push(mut self, outcome: ReadOutcome) -> Self {
        self.script.push_back(Ok(outcome));
        self
    }

    /// Fail with `msg` once the preceding script is consumed.
    pub fn then_fail(mut self, msg: impl Into<String>) -> Self {
        self.script.push_back(Err(msg.into()));
        self
    }
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error + Send + Sync>> {
        match self.script.pop_front() {
            Some(Ok(o)) => Ok(o),
            Some(Err(msg)) => Err(Box::new(std::io::Error::other(msg))),
            None => Ok(ReadOutcome::Closed),
        }
    }
}

/// A sink that keeps every accepted point in memory.
///
/// The first `fail_first` writes are rejected.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub points: Vec<MeasurementRecord>,
    pub fail_first: usize,
    pub attempts: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::default()
        }
    }
}

impl PointSink for MemorySink {
    fn write_points(
        &mut self,
        points: &[MeasurementRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.attempts += 1;
        if self.attempts <= self.fail_first {
            return Err("store rejected write".into());
        }
        self.points.extend_from_slice(points);
        Ok(())
    }
}
