use crate::amplitude::GainCurve;
use crate::error::{Result, TunerError};
use crate::station::Station;
use std::collections::BTreeMap;

/// Extra clearance between two stations' fade bands, in MHz.
const SPACING_MARGIN: f64 = 0.1;

/// Immutable list of stations, in registration order.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

/// Two neighbouring stations whose fade bands overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingWarning {
    pub lower: String,
    pub upper: String,
    pub distance: f64,
    pub minimum: f64,
}

impl StationCatalog {
    /// Build a catalog. Names and frequencies must be unique.
    pub fn new(stations: Vec<Station>) -> Result<Self> {
        for (i, s) in stations.iter().enumerate() {
            for earlier in &stations[..i] {
                if earlier.name() == s.name() {
                    return Err(TunerError::DuplicateStation(format!(
                        "name '{}' registered twice",
                        s.name()
                    )));
                }
                if earlier.frequency() == s.frequency() {
                    return Err(TunerError::DuplicateStation(format!(
                        "'{}' and '{}' both on {} MHz",
                        earlier.name(),
                        s.name(),
                        s.frequency()
                    )));
                }
            }
        }
        Ok(StationCatalog { stations })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Find a station by name.
    pub fn get(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name() == name)
    }

    /// The station nearest to `frequency`. On an exact tie the earlier
    /// registered station wins.
    pub fn closest(&self, frequency: f64) -> Result<&Station> {
        if !frequency.is_finite() {
            return Err(TunerError::NonFiniteFrequency(frequency));
        }
        let mut best: Option<(&Station, f64)> = None;
        for station in &self.stations {
            let distance = station.distance(frequency);
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((station, distance)),
            }
        }
        best.map(|(s, _)| s).ok_or(TunerError::EmptyCatalog)
    }

    /// Station name → frequency, for status output.
    pub fn frequencies(&self) -> BTreeMap<String, f64> {
        self.stations
            .iter()
            .map(|s| (s.name().to_string(), s.frequency()))
            .collect()
    }

    /// Neighbouring stations close enough that one's fade band reaches into
    /// the other's.
    pub fn spacing_warnings(&self, curve: &GainCurve) -> Vec<SpacingWarning> {
        let minimum = curve.fade_range * 2.0 + curve.station_width + SPACING_MARGIN;
        let mut sorted: Vec<&Station> = self.stations.iter().collect();
        sorted.sort_by(|a, b| a.frequency().total_cmp(&b.frequency()));

        sorted
            .windows(2)
            .filter_map(|pair| {
                let distance = pair[1].frequency() - pair[0].frequency();
                (distance < minimum).then(|| SpacingWarning {
                    lower: pair[0].name().to_string(),
                    upper: pair[1].name().to_string(),
                    distance,
                    minimum,
                })
            })
            .collect()
    }
}
