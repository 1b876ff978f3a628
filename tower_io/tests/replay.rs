use std::fs;

use tempfile::tempdir;
use tower_io::{IoError, open_replay};
use tower_traits::{LineSource, ReadOutcome};

#[test]
fn replays_capture_file_to_the_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("capture.txt");
    fs::write(&path, "35.0,55.2,21.5,19.0,6.8,1,x,x,x\r\n35.1,55.0,21.4,19.0,6.8,1,x,x,x\r\n").unwrap();

    let mut src = open_replay(&path).unwrap();
    let mut lines = Vec::new();
    loop {
        match src.read_line().unwrap() {
            ReadOutcome::Line(l) => lines.push(l),
            ReadOutcome::Idle => continue,
            ReadOutcome::Closed => break,
        }
    }
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("35.1,"));
    assert_eq!(src.read_line().unwrap(), ReadOutcome::Closed);
}

#[test]
fn missing_capture_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = open_replay(&dir.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}
