use crate::catalog::StationCatalog;
use serde::Serialize;
use std::collections::BTreeMap;

/// What the tuner has committed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TunerState {
    pub current_frequency: Option<f64>,
    pub current_station: Option<String>,
}

impl TunerState {
    /// True until the first successful tune.
    pub fn is_uninitialized(&self) -> bool {
        self.current_station.is_none()
    }
}

/// Flat status returned to callers after every tune.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Station closest to the dial, empty before the first tune.
    pub station_name: String,
    /// 1 when the dial is within the audible range of the station.
    pub station_audible: u8,
    /// Every station's frequency, by name.
    pub stations: BTreeMap<String, f64>,
}

impl StatusSnapshot {
    /// Project tuner state onto the status shape. `audible_range` is the
    /// caller-facing "can hear it" distance in MHz.
    pub fn project(catalog: &StationCatalog, state: &TunerState, audible_range: f64) -> Self {
        let station = state
            .current_station
            .as_deref()
            .and_then(|name| catalog.get(name));

        let station_audible = match (station, state.current_frequency) {
            (Some(s), Some(f)) if s.distance(f) <= audible_range => 1,
            _ => 0,
        };

        StatusSnapshot {
            station_name: station.map(|s| s.name().to_string()).unwrap_or_default(),
            station_audible,
            stations: catalog.frequencies(),
        }
    }
}
