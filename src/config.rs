//! Radio configuration: stations, static track and tuning knobs, read from
//! a JSON file.

use crate::band::FrequencyBand;
use crate::catalog::StationCatalog;
use crate::error::{Result, TunerError};
use crate::station::{Station, DEFAULT_PROBE_TIMEOUT};
use crate::tuner::TuningSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const CONFIG_FILE: &str = "stations.json";

/// One station entry in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub frequency: f64,
    pub file: PathBuf,
    /// Track length in ms. Probed from the file when absent.
    #[serde(default)]
    pub length_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Static track played between stations.
    pub noise: PathBuf,
    #[serde(default)]
    pub band: FrequencyBand,
    #[serde(default)]
    pub tuning: TuningSettings,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    pub stations: Vec<StationEntry>,
    /// Directory relative paths resolve against.
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT.as_millis() as u64
}

impl RadioConfig {
    /// `<config dir>/radio_tuner/stations.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("radio_tuner").join(CONFIG_FILE))
    }

    /// Load a config file. Relative asset paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            TunerError::Config(format!("could not read '{}': {}", path.display(), e))
        })?;
        let mut config = Self::from_json(&data)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse a config from JSON. Relative paths resolve against the working
    /// directory.
    pub fn from_json(data: &str) -> Result<Self> {
        let config: RadioConfig = serde_json::from_str(data)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.band.min >= self.band.max {
            return Err(TunerError::Config(format!(
                "band minimum {} must be below maximum {}",
                self.band.min, self.band.max
            )));
        }
        let t = &self.tuning;
        if t.curve.station_width < 0.0 || t.curve.fade_range < 0.0 {
            return Err(TunerError::Config(
                "station_width and fade_range must not be negative".into(),
            ));
        }
        if t.frequency_tolerance < 0.0 || t.audible_range < 0.0 {
            return Err(TunerError::Config(
                "frequency_tolerance and audible_range must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Resolve a path from the config file.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn noise_path(&self) -> PathBuf {
        self.resolve(&self.noise)
    }

    /// Register every usable station. Stations whose asset cannot be probed
    /// or has no length are skipped with a warning; duplicates are an error.
    pub fn build_catalog(&self) -> Result<StationCatalog> {
        let timeout = self.probe_timeout();
        let mut stations = Vec::with_capacity(self.stations.len());

        for entry in &self.stations {
            let asset = self.resolve(&entry.file);
            let result = match entry.length_ms {
                Some(length_ms) => {
                    Station::with_length_ms(&entry.name, entry.frequency, asset, length_ms)
                }
                None => Station::probe(&entry.name, entry.frequency, asset, timeout),
            };

            match result {
                Ok(station) => {
                    info!(
                        station = station.name(),
                        frequency = station.frequency(),
                        length = %station.length_display(),
                        "registered station"
                    );
                    stations.push(station);
                }
                Err(e) => warn!("Skipping station '{}': {}", entry.name, e),
            }
        }

        StationCatalog::new(stations)
    }
}
