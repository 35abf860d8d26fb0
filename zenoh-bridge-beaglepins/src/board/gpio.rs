//! Digital inputs through the Linux sysfs GPIO interface.
//!
//! ```text
//! /sys/class/gpio/export            write N to expose gpioN
//! /sys/class/gpio/gpioN/direction   "in" / "out"
//! /sys/class/gpio/gpioN/value       "0" / "1"
//! /sys/class/gpio/unexport          write N to release
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::DigitalLines;
use super::header::gpio_number;
use crate::error::ReadError;

/// A freshly exported line shows up, and gets its permissions fixed by
/// udev, shortly after the export write returns.
const DIRECTION_ATTEMPTS: u32 = 25;
const DIRECTION_RETRY_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy)]
struct Line {
    number: u32,
    /// Whether this process exported the line and must unexport it.
    exported: bool,
}

/// GPIO lines claimed through sysfs.
#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    lines: HashMap<String, Line>,
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lines: HashMap::new(),
        }
    }

    fn line_dir(&self, number: u32) -> PathBuf {
        self.root.join(format!("gpio{}", number))
    }
}

impl DigitalLines for SysfsGpio {
    fn claim(&mut self, id: &str) -> Result<(), ReadError> {
        let number = gpio_number(id).ok_or_else(|| ReadError::UnknownPin { id: id.to_string() })?;
        let dir = self.line_dir(number);

        let exported = if dir.is_dir() {
            false
        } else {
            fs::write(self.root.join("export"), number.to_string())
                .map_err(|e| ReadError::io(id, "export", e))?;
            true
        };

        let line = Line { number, exported };

        if let Err(e) = set_input(&dir.join("direction"), exported) {
            if exported {
                let _ = fs::write(self.root.join("unexport"), number.to_string());
            }
            return Err(ReadError::io(id, "set direction", e));
        }

        debug!(pin = id, gpio = number, exported, "Claimed GPIO input");
        self.lines.insert(id.to_string(), line);
        Ok(())
    }

    fn read(&mut self, id: &str) -> Result<bool, ReadError> {
        let line = self
            .lines
            .get(id)
            .ok_or_else(|| ReadError::NotClaimed { id: id.to_string() })?;

        let raw = fs::read_to_string(self.line_dir(line.number).join("value"))
            .map_err(|e| ReadError::io(id, "read value", e))?;

        match raw.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(ReadError::Parse {
                id: id.to_string(),
                value: other.to_string(),
            }),
        }
    }

    fn release(&mut self, id: &str) -> Result<(), ReadError> {
        let Some(line) = self.lines.remove(id) else {
            return Ok(());
        };
        if line.exported {
            fs::write(self.root.join("unexport"), line.number.to_string())
                .map_err(|e| ReadError::io(id, "unexport", e))?;
        }
        Ok(())
    }
}

/// Write "in" to a direction file, retrying while a line we just
/// exported is still settling.
fn set_input(direction: &Path, fresh: bool) -> io::Result<()> {
    let mut attempt = 1;
    loop {
        match fs::write(direction, "in") {
            Err(e) if fresh && attempt < DIRECTION_ATTEMPTS && is_settling(&e) => {
                attempt += 1;
                thread::sleep(DIRECTION_RETRY_DELAY);
            }
            result => return result,
        }
    }
}

fn is_settling(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_line(root: &Path, number: u32, value: &str) {
        let dir = root.join(format!("gpio{}", number));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("direction"), "out").unwrap();
        fs::write(dir.join("value"), value).unwrap();
    }

    #[test]
    fn test_claim_sets_direction_and_reads() {
        let tmp = tempfile::tempdir().unwrap();
        fake_line(tmp.path(), 60, "1\n");

        let mut gpio = SysfsGpio::new(tmp.path());
        gpio.claim("P9_12").unwrap();

        let direction = fs::read_to_string(tmp.path().join("gpio60/direction")).unwrap();
        assert_eq!(direction, "in");
        assert!(gpio.read("P9_12").unwrap());

        fs::write(tmp.path().join("gpio60/value"), "0\n").unwrap();
        assert!(!gpio.read("P9_12").unwrap());
    }

    #[test]
    fn test_unclaimed_line_is_not_read() {
        let tmp = tempfile::tempdir().unwrap();
        fake_line(tmp.path(), 60, "1");

        let mut gpio = SysfsGpio::new(tmp.path());
        assert!(matches!(
            gpio.read("P9_12"),
            Err(ReadError::NotClaimed { .. })
        ));
    }

    #[test]
    fn test_unknown_pin_fails_claim() {
        let tmp = tempfile::tempdir().unwrap();
        let mut gpio = SysfsGpio::new(tmp.path());
        assert!(matches!(
            gpio.claim("P1_1"),
            Err(ReadError::UnknownPin { .. })
        ));
    }

    #[test]
    fn test_export_failure_is_reported() {
        // No export file and no gpio dir: the kernel interface is absent.
        let tmp = tempfile::tempdir().unwrap();
        let mut gpio = SysfsGpio::new(tmp.path().join("missing"));
        let err = gpio.claim("P8_3").unwrap_err();
        assert!(matches!(err, ReadError::Io { op: "export", .. }));
    }

    #[test]
    fn test_claim_waits_for_exported_line_to_settle() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("export"), "").unwrap();

        // gpio60 appears, fully populated, a little after the export write.
        let staging = tmp.path().join("staging");
        fake_line(&staging, 60, "1");
        let root = tmp.path().to_path_buf();
        let kernel = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            fs::rename(staging.join("gpio60"), root.join("gpio60")).unwrap();
        });

        let mut gpio = SysfsGpio::new(tmp.path());
        gpio.claim("P9_12").unwrap();
        kernel.join().unwrap();

        assert_eq!(fs::read_to_string(tmp.path().join("export")).unwrap(), "60");
        assert_eq!(
            fs::read_to_string(tmp.path().join("gpio60/direction")).unwrap(),
            "in"
        );
        assert!(gpio.read("P9_12").unwrap());
    }

    #[test]
    fn test_line_that_never_appears_is_unexported() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("export"), "").unwrap();
        fs::write(tmp.path().join("unexport"), "").unwrap();

        let mut gpio = SysfsGpio::new(tmp.path());
        let err = gpio.claim("P9_12").unwrap_err();

        assert!(matches!(err, ReadError::Io { op: "set direction", .. }));
        assert_eq!(fs::read_to_string(tmp.path().join("unexport")).unwrap(), "60");
    }

    #[test]
    fn test_garbage_value_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        fake_line(tmp.path(), 38, "x");

        let mut gpio = SysfsGpio::new(tmp.path());
        gpio.claim("P8_3").unwrap();
        assert!(matches!(gpio.read("P8_3"), Err(ReadError::Parse { .. })));
    }

    #[test]
    fn test_release_only_unexports_own_lines() {
        let tmp = tempfile::tempdir().unwrap();
        fake_line(tmp.path(), 60, "1");
        fs::write(tmp.path().join("unexport"), "").unwrap();

        let mut gpio = SysfsGpio::new(tmp.path());
        gpio.claim("P9_12").unwrap();
        gpio.release("P9_12").unwrap();

        // Pre-existing line: left exported.
        assert_eq!(fs::read_to_string(tmp.path().join("unexport")).unwrap(), "");
        assert!(matches!(
            gpio.read("P9_12"),
            Err(ReadError::NotClaimed { .. })
        ));
    }
}
