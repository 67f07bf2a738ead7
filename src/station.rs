use crate::error::{Result, TunerError};
use lofty::file::AudioFile;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// How long startup waits for an asset's length before giving up.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// A fixed broadcast point with its own audio asset.
///
/// The broadcast offset is picked once at creation so every station sounds
/// like it has been on air long before the process started.
#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    frequency: f64,
    asset: PathBuf,
    length_ms: f64,
    broadcast_offset_ms: f64,
}

impl Station {
    /// Create a station with a random broadcast offset in `[0, length)`.
    pub fn new(
        name: impl Into<String>,
        frequency: f64,
        asset: impl Into<PathBuf>,
        length: Duration,
    ) -> Result<Self> {
        Self::with_length_ms(name, frequency, asset, length.as_secs_f64() * 1000.0)
    }

    /// Create a station from a length in ms, with a random broadcast offset.
    pub fn with_length_ms(
        name: impl Into<String>,
        frequency: f64,
        asset: impl Into<PathBuf>,
        length_ms: f64,
    ) -> Result<Self> {
        let offset_ms = if length_ms.is_finite() && length_ms > 0.0 {
            fastrand::f64() * length_ms
        } else {
            0.0
        };
        Self::with_offset(name, frequency, asset, length_ms, offset_ms)
    }

    /// Create a station with an explicit broadcast offset.
    pub fn with_offset(
        name: impl Into<String>,
        frequency: f64,
        asset: impl Into<PathBuf>,
        length_ms: f64,
        broadcast_offset_ms: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !frequency.is_finite() {
            return Err(TunerError::NonFiniteFrequency(frequency));
        }
        if !(length_ms.is_finite() && length_ms > 0.0) {
            return Err(TunerError::asset(
                name,
                format!("track length must be positive, got {} ms", length_ms),
            ));
        }
        if !(0.0..length_ms).contains(&broadcast_offset_ms) {
            return Err(TunerError::asset(
                name,
                format!(
                    "broadcast offset {} ms outside track length {} ms",
                    broadcast_offset_ms, length_ms
                ),
            ));
        }
        Ok(Station {
            name,
            frequency,
            asset: asset.into(),
            length_ms,
            broadcast_offset_ms,
        })
    }

    /// Create a station by probing the asset's length, waiting at most `timeout`.
    pub fn probe(
        name: impl Into<String>,
        frequency: f64,
        asset: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let name = name.into();
        let asset = asset.into();
        let length = probe_length(&asset, timeout).map_err(|e| TunerError::asset(&name, e))?;
        Self::new(name, frequency, asset, length)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Broadcast frequency in MHz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn asset(&self) -> &Path {
        &self.asset
    }

    pub fn length_ms(&self) -> f64 {
        self.length_ms
    }

    pub fn broadcast_offset_ms(&self) -> f64 {
        self.broadcast_offset_ms
    }

    /// Distance in MHz between this station and a dial position.
    pub fn distance(&self, frequency: f64) -> f64 {
        (self.frequency - frequency).abs()
    }

    /// Format track length as H:MM:SS.
    pub fn length_display(&self) -> String {
        let secs = (self.length_ms / 1000.0) as u64;
        format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

/// Read an asset's duration on a worker thread, bounded by `timeout`.
///
/// A probe that never returns leaves its thread behind; startup carries on.
pub fn probe_length(path: &Path, timeout: Duration) -> std::result::Result<Duration, String> {
    let (tx, rx) = mpsc::channel();
    let owned = path.to_path_buf();

    std::thread::Builder::new()
        .name("asset-probe".into())
        .spawn(move || {
            let result = lofty::read_from_path(&owned)
                .map(|tagged| tagged.properties().duration())
                .map_err(|e| format!("Failed to read '{}': {}", owned.display(), e));
            let _ = tx.send(result);
        })
        .map_err(|e| format!("Failed to spawn probe thread: {}", e))?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(length)) if length.is_zero() => {
            Err(format!("'{}' reports zero length", path.display()))
        }
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(format!(
            "Timed out after {:?} probing '{}'",
            timeout,
            path.display()
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(format!("Probe of '{}' aborted", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_offset_stays_within_track() {
        for _ in 0..100 {
            let s = Station::new("A", 89.6, "a.mp3", Duration::from_secs(3)).unwrap();
            assert!(s.broadcast_offset_ms() >= 0.0);
            assert!(s.broadcast_offset_ms() < 3000.0);
        }
    }

    #[test]
    fn zero_length_is_invalid_asset() {
        let result = Station::new("A", 89.6, "a.mp3", Duration::ZERO);
        assert!(matches!(result, Err(TunerError::InvalidAsset { .. })));
    }

    #[test]
    fn negative_length_is_invalid_asset() {
        let result = Station::with_offset("A", 89.6, "a.mp3", -5.0, 0.0);
        assert!(matches!(result, Err(TunerError::InvalidAsset { .. })));
    }

    #[test]
    fn offset_outside_track_rejected() {
        let result = Station::with_offset("A", 89.6, "a.mp3", 1000.0, 1000.0);
        assert!(matches!(result, Err(TunerError::InvalidAsset { .. })));
    }

    #[test]
    fn non_finite_frequency_rejected() {
        let result = Station::with_offset("A", f64::NAN, "a.mp3", 1000.0, 0.0);
        assert!(matches!(result, Err(TunerError::NonFiniteFrequency(_))));
    }

    #[test]
    fn distance_is_symmetric() {
        let s = Station::with_offset("A", 98.3, "a.mp3", 1000.0, 0.0).unwrap();
        assert!((s.distance(98.0) - 0.3).abs() < 1e-9);
        assert!((s.distance(98.6) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn length_display_formats_correctly() {
        let s = Station::with_offset("A", 98.3, "a.mp3", 3_783_800.0, 0.0).unwrap();
        assert_eq!(s.length_display(), "1:03:03");
    }

    #[test]
    fn probe_rejects_missing_file() {
        let result = Station::probe(
            "Ghost",
            90.0,
            "nonexistent_station.mp3",
            DEFAULT_PROBE_TIMEOUT,
        );
        assert!(matches!(result, Err(TunerError::InvalidAsset { .. })));
    }
}
