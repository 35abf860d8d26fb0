//! Per-source sample values.

use std::fmt;

use serde::{Serialize, Serializer};

/// Literal published in place of a value that could not be read.
pub const ERROR_MARKER: &str = "ERROR";

/// Fractional digits kept on converted voltages.
pub const VOLTAGE_DECIMALS: usize = 3;

/// Result of probing a peripheral bus device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Liveness {
    Active,
    Inactive,
}

impl Liveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Liveness::Active => "Active",
            Liveness::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading in a snapshot. Exactly one variant per source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    /// Digital input level.
    Level(bool),
    /// Calibrated analog voltage, already rounded.
    Voltage(f64),
    /// Bus device availability.
    Liveness(Liveness),
    /// The source could not be read this cycle.
    Error,
}

impl SampleValue {
    pub fn is_error(&self) -> bool {
        matches!(self, SampleValue::Error)
    }
}

impl From<bool> for SampleValue {
    fn from(level: bool) -> Self {
        SampleValue::Level(level)
    }
}

impl From<Liveness> for SampleValue {
    fn from(state: Liveness) -> Self {
        SampleValue::Liveness(state)
    }
}

impl Serialize for SampleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SampleValue::Level(level) => serializer.serialize_bool(*level),
            SampleValue::Voltage(volts) => serializer.serialize_f64(*volts),
            SampleValue::Liveness(state) => serializer.serialize_str(state.as_str()),
            SampleValue::Error => serializer.serialize_str(ERROR_MARKER),
        }
    }
}

/// Text form used in logs and the `text` wire format.
impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Level(level) => write!(f, "{}", level),
            SampleValue::Voltage(volts) => write!(f, "{:.*}", VOLTAGE_DECIMALS, volts),
            SampleValue::Liveness(state) => write!(f, "\"{}\"", state),
            SampleValue::Error => write!(f, "\"{}\"", ERROR_MARKER),
        }
    }
}

/// Scale a normalized ADC sample to volts, rounded to [`VOLTAGE_DECIMALS`].
///
/// Samples outside `[0, 1]` are clamped first.
pub fn to_voltage(normalized: f64, scale_factor: f64) -> f64 {
    let factor = 10f64.powi(VOLTAGE_DECIMALS as i32);
    (normalized.clamp(0.0, 1.0) * scale_factor * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_scale_is_0_9_volts() {
        assert_eq!(to_voltage(0.5, 1.8), 0.9);
    }

    #[test]
    fn test_voltage_rounding() {
        assert_eq!(to_voltage(0.123456, 1.8), 0.222);
        assert_eq!(to_voltage(1.0, 1.8), 1.8);
        assert_eq!(to_voltage(0.0, 1.8), 0.0);
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        assert_eq!(to_voltage(1.2, 1.8), 1.8);
        assert_eq!(to_voltage(-0.1, 1.8), 0.0);
    }

    #[test]
    fn test_text_rendering() {
        assert_eq!(SampleValue::Level(true).to_string(), "true");
        assert_eq!(SampleValue::Voltage(0.9).to_string(), "0.900");
        assert_eq!(
            SampleValue::Liveness(Liveness::Inactive).to_string(),
            "\"Inactive\""
        );
        assert_eq!(SampleValue::Error.to_string(), "\"ERROR\"");
    }

    #[test]
    fn test_json_tagging() {
        let values = vec![
            SampleValue::Level(false),
            SampleValue::Voltage(1.25),
            SampleValue::Liveness(Liveness::Active),
            SampleValue::Error,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[false,1.25,"Active","ERROR"]"#);
    }
}
