//! Analog inputs through the Linux IIO ADC driver.

use std::fs;
use std::path::{Path, PathBuf};

use super::AnalogInputs;
use super::header::ain_channel;
use crate::error::ReadError;

/// The AM335x touchscreen/ADC exposed as an IIO device.
#[derive(Debug)]
pub struct IioAdc {
    device: PathBuf,
    full_scale: f64,
    ready: bool,
}

impl IioAdc {
    /// `full_scale` is the raw count corresponding to the reference voltage.
    pub fn new(device: impl Into<PathBuf>, full_scale: f64) -> Self {
        Self {
            device: device.into(),
            full_scale,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl AnalogInputs for IioAdc {
    fn init(&mut self) -> Result<(), ReadError> {
        if !self.device.is_dir() {
            self.ready = false;
            return Err(ReadError::AdcUnavailable {
                reason: format!("{} not found", self.device.display()),
            });
        }
        self.ready = true;
        Ok(())
    }

    fn read_normalized(&mut self, id: &str) -> Result<f64, ReadError> {
        if !self.ready {
            return Err(ReadError::AdcUnavailable {
                reason: "not initialized".to_string(),
            });
        }

        let channel = ain_channel(id).ok_or_else(|| ReadError::UnknownPin { id: id.to_string() })?;
        let path = self.device.join(format!("in_voltage{}_raw", channel));

        let raw = fs::read_to_string(&path).map_err(|e| ReadError::io(id, "read adc", e))?;
        let counts: u32 = raw.trim().parse().map_err(|_| ReadError::Parse {
            id: id.to_string(),
            value: raw.trim().to_string(),
        })?;

        Ok(f64::from(counts) / self.full_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_device(values: &[(u8, &str)]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for (channel, value) in values {
            fs::write(
                tmp.path().join(format!("in_voltage{}_raw", channel)),
                value,
            )
            .unwrap();
        }
        tmp
    }

    #[test]
    fn test_reads_normalized_sample() {
        let tmp = fake_device(&[(4, "4095\n"), (0, "0\n")]);
        let mut adc = IioAdc::new(tmp.path(), 4095.0);
        adc.init().unwrap();

        assert_eq!(adc.read_normalized("P9_33").unwrap(), 1.0);
        assert_eq!(adc.read_normalized("AIN0").unwrap(), 0.0);
    }

    #[test]
    fn test_read_before_init_fails() {
        let tmp = fake_device(&[(4, "100")]);
        let mut adc = IioAdc::new(tmp.path(), 4095.0);
        assert!(matches!(
            adc.read_normalized("P9_33"),
            Err(ReadError::AdcUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_device_fails_init() {
        let mut adc = IioAdc::new("/nonexistent/iio:device0", 4095.0);
        assert!(adc.init().is_err());
        assert!(!adc.is_ready());
    }

    #[test]
    fn test_missing_channel_is_io_error() {
        let tmp = fake_device(&[]);
        let mut adc = IioAdc::new(tmp.path(), 4095.0);
        adc.init().unwrap();
        assert!(matches!(
            adc.read_normalized("P9_35"),
            Err(ReadError::Io { .. })
        ));
    }

    #[test]
    fn test_unparsable_sample() {
        let tmp = fake_device(&[(6, "busy")]);
        let mut adc = IioAdc::new(tmp.path(), 4095.0);
        adc.init().unwrap();
        assert!(matches!(
            adc.read_normalized("P9_35"),
            Err(ReadError::Parse { .. })
        ));
    }
}
