use crate::error::{Result, TunerError};
use serde::{Deserialize, Serialize};

/// Receivable frequency band, inclusive on both ends.
///
/// Requests are checked here before they reach the tuner; the tuner itself
/// only resolves the nearest station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyBand {
    pub min: f64,
    pub max: f64,
}

impl Default for FrequencyBand {
    fn default() -> Self {
        FrequencyBand {
            min: 85.0,
            max: 108.0,
        }
    }
}

impl FrequencyBand {
    pub fn contains(&self, frequency: f64) -> bool {
        (self.min..=self.max).contains(&frequency)
    }

    /// Accept a frequency inside the band.
    pub fn validate(&self, frequency: f64) -> Result<f64> {
        if self.contains(frequency) {
            Ok(frequency)
        } else {
            Err(TunerError::OutOfRangeFrequency {
                frequency,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Parse a request like `"98.3"` or `"105"` and validate it.
    pub fn parse(&self, input: &str) -> Result<f64> {
        let trimmed = input.trim();
        let frequency: f64 = trimmed
            .parse()
            .map_err(|_| TunerError::UnparsableFrequency(trimmed.to_string()))?;
        if !frequency.is_finite() {
            return Err(TunerError::UnparsableFrequency(trimmed.to_string()));
        }
        self.validate(frequency)
    }
}
