//! Tuner — the shared radio.
//!
//! One `Tuner` serves every caller. A single mutex covers the committed
//! state and both playback channels for the whole of a transition, so
//! channel commands from two tunes never interleave and a failed tune
//! leaves the last good state in place.

use crate::amplitude::GainCurve;
use crate::catalog::StationCatalog;
use crate::channel::PlaybackChannel;
use crate::clock::BroadcastClock;
use crate::error::Result;
use crate::station::Station;
use crate::status::{StatusSnapshot, TunerState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};

/// Tuning behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSettings {
    pub curve: GainCurve,
    /// Dial moves smaller than this (MHz) are ignored once a station is set.
    pub frequency_tolerance: f64,
    /// Distance (MHz) within which the status reports the station as audible.
    /// Independent of the gain curve's bands.
    pub audible_range: f64,
}

impl Default for TuningSettings {
    fn default() -> Self {
        TuningSettings {
            curve: GainCurve::default(),
            frequency_tolerance: 0.05,
            audible_range: 0.3,
        }
    }
}

/// Whether each channel is currently producing sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelActivity {
    pub noise: bool,
    pub station: bool,
}

struct TunerInner<C> {
    state: TunerState,
    noise: C,
    station: C,
    /// Station whose asset the station channel holds. Can run ahead of
    /// `state` when a tune failed after loading.
    loaded: Option<String>,
    /// Channels match `state`. Cleared while a transition runs, so a tune
    /// that failed partway leaves it false until the next commit.
    settled: bool,
}

pub struct Tuner<C> {
    catalog: StationCatalog,
    settings: TuningSettings,
    clock: BroadcastClock,
    inner: Mutex<TunerInner<C>>,
}

impl<C: PlaybackChannel> Tuner<C> {
    /// Build the tuner and load static into the noise channel. Static starts
    /// with the first tune.
    pub fn new(
        catalog: StationCatalog,
        settings: TuningSettings,
        noise_asset: &Path,
        noise: C,
        station: C,
    ) -> Result<Self> {
        Self::with_clock(
            catalog,
            settings,
            BroadcastClock::start(),
            noise_asset,
            noise,
            station,
        )
    }

    /// Like `new`, with an explicit broadcast clock.
    pub fn with_clock(
        catalog: StationCatalog,
        settings: TuningSettings,
        clock: BroadcastClock,
        noise_asset: &Path,
        mut noise: C,
        station: C,
    ) -> Result<Self> {
        noise.load(noise_asset)?;
        info!(
            stations = catalog.len(),
            noise = %noise_asset.display(),
            "tuner ready"
        );
        Ok(Tuner {
            catalog,
            settings,
            clock,
            inner: Mutex::new(TunerInner {
                state: TunerState::default(),
                noise,
                station,
                loaded: None,
                settled: true,
            }),
        })
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &TuningSettings {
        &self.settings
    }

    pub fn clock(&self) -> &BroadcastClock {
        &self.clock
    }

    /// Copy of the committed state.
    pub fn state(&self) -> TunerState {
        self.lock().state.clone()
    }

    /// Current status without touching the channels.
    pub fn status(&self) -> StatusSnapshot {
        let inner = self.lock();
        self.snapshot(&inner.state)
    }

    pub fn channels_playing(&self) -> ChannelActivity {
        let inner = self.lock();
        ChannelActivity {
            noise: inner.noise.is_playing(),
            station: inner.station.is_playing(),
        }
    }

    /// Move the dial to `frequency` (MHz) and return the resulting status.
    ///
    /// The frequency is not range-checked here; see `FrequencyBand`.
    pub fn set_frequency(&self, frequency: f64) -> Result<StatusSnapshot> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        if let (true, Some(current), Some(_)) = (
            inner.settled,
            inner.state.current_frequency,
            &inner.state.current_station,
        ) {
            if (frequency - current).abs() < self.settings.frequency_tolerance {
                debug!(frequency, current, "within tolerance, nothing to do");
                return Ok(self.snapshot(&inner.state));
            }
        }

        let station = self.catalog.closest(frequency)?;
        let distance = station.distance(frequency);
        let gains = self.settings.curve.gain(distance);
        inner.settled = false;

        let changed = inner.state.current_station.as_deref() != Some(station.name())
            || inner.loaded.as_deref() != Some(station.name());
        if changed {
            info!(
                station = station.name(),
                frequency,
                previous = inner.state.current_station.as_deref().unwrap_or("-"),
                "changing station"
            );
            inner.loaded = None;
            inner.station.stop()?;
            inner.station.load(station.asset())?;
            inner.loaded = Some(station.name().to_string());
        }

        if gains.fully_detuned() {
            inner.station.stop()?;
        } else if !inner.station.is_playing() {
            self.start_station(&mut inner.station, station)?;
        }

        if gains.fully_tuned() {
            inner.noise.stop()?;
        } else if !inner.noise.is_playing() {
            inner.noise.play()?;
        }

        inner.station.set_gain(gains.station_db)?;
        inner.noise.set_gain(gains.noise_db)?;

        inner.state.current_frequency = Some(frequency);
        inner.state.current_station = Some(station.name().to_string());
        inner.settled = true;
        debug!(
            frequency,
            station = station.name(),
            distance,
            station_db = gains.station_db,
            noise_db = gains.noise_db,
            "tuned"
        );
        Ok(self.snapshot(&inner.state))
    }

    /// Start the station channel at the point its broadcast has reached.
    fn start_station(&self, channel: &mut C, station: &Station) -> Result<()> {
        channel.play()?;
        let position = self.clock.position(station, Instant::now())?;
        channel.seek(position)
    }

    fn snapshot(&self, state: &TunerState) -> StatusSnapshot {
        StatusSnapshot::project(&self.catalog, state, self.settings.audible_range)
    }

    // State is only written after every channel command succeeded, so a
    // poisoned lock still guards a consistent state.
    fn lock(&self) -> MutexGuard<'_, TunerInner<C>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
