use crate::error::{Result, TunerError};
use crate::station::Station;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Virtual broadcast clock: every station has been on air since the process
/// started, each from its own random point in the track.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastClock {
    started: Instant,
    started_at: DateTime<Local>,
}

impl BroadcastClock {
    /// Start the clock now.
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock that started at a given instant (for replaying a schedule).
    pub fn starting_at(started: Instant) -> Self {
        let ago = chrono::Duration::from_std(started.elapsed())
            .unwrap_or(chrono::Duration::zero());
        BroadcastClock {
            started,
            started_at: Local::now() - ago,
        }
    }

    /// Wall-clock time the broadcast started.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Milliseconds on air at `now`. Instants before the start count as zero.
    pub fn elapsed_ms(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started).as_secs_f64() * 1000.0
    }

    /// Position in ms within the station's track that is on air at `now`.
    pub fn offset_ms(&self, station: &Station, now: Instant) -> Result<f64> {
        broadcast_position(
            self.elapsed_ms(now),
            station.broadcast_offset_ms(),
            station.length_ms(),
        )
        .map_err(|reason| TunerError::asset(station.name(), reason))
    }

    /// Seek target for the station at `now`.
    pub fn position(&self, station: &Station, now: Instant) -> Result<Duration> {
        Ok(Duration::from_secs_f64(self.offset_ms(station, now)? / 1000.0))
    }
}

/// `(elapsed + offset) mod length`, always in `[0, length)`.
pub fn broadcast_position(
    elapsed_ms: f64,
    broadcast_offset_ms: f64,
    length_ms: f64,
) -> std::result::Result<f64, String> {
    if !(length_ms.is_finite() && length_ms > 0.0) {
        return Err(format!("track length must be positive, got {} ms", length_ms));
    }
    let position = (elapsed_ms + broadcast_offset_ms).rem_euclid(length_ms);
    // rem_euclid can round up to exactly `length` for tiny negative inputs
    if position >= length_ms {
        Ok(0.0)
    } else {
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_wraps_around_track() {
        assert_eq!(broadcast_position(0.0, 0.0, 1000.0).unwrap(), 0.0);
        assert_eq!(broadcast_position(250.0, 500.0, 1000.0).unwrap(), 750.0);
        assert_eq!(broadcast_position(750.0, 500.0, 1000.0).unwrap(), 250.0);
        assert_eq!(broadcast_position(1000.0, 0.0, 1000.0).unwrap(), 0.0);
    }

    #[test]
    fn position_handles_long_uptime() {
        // a month on air
        let elapsed = 30.0 * 24.0 * 3600.0 * 1000.0;
        let pos = broadcast_position(elapsed, 1234.5, 3_783_800.0).unwrap();
        assert!((0.0..3_783_800.0).contains(&pos));
    }

    #[test]
    fn position_always_in_range() {
        let length = 6_236_400.0;
        let mut elapsed = 0.0;
        while elapsed < 5.0 * length {
            for offset in [0.0, 1.0, length / 2.0, length - 1e-6] {
                let pos = broadcast_position(elapsed, offset, length).unwrap();
                assert!(pos >= 0.0 && pos < length, "{} + {} -> {}", elapsed, offset, pos);
            }
            elapsed += 123_457.3;
        }
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(broadcast_position(10.0, 0.0, 0.0).is_err());
        assert!(broadcast_position(10.0, 0.0, -1.0).is_err());
        assert!(broadcast_position(10.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn clock_offsets_by_elapsed_time() {
        let start = Instant::now();
        let clock = BroadcastClock::starting_at(start);
        let station = Station::with_offset("A", 90.0, "a.mp3", 10_000.0, 9_000.0).unwrap();

        let at = start + Duration::from_millis(2_500);
        let offset = clock.offset_ms(&station, at).unwrap();
        assert!((offset - 1_500.0).abs() < 1e-6);
        assert_eq!(
            clock.position(&station, at).unwrap(),
            Duration::from_millis(1_500)
        );
    }

    #[test]
    fn instants_before_start_count_as_zero() {
        let start = Instant::now() + Duration::from_secs(5);
        let clock = BroadcastClock::starting_at(start);
        assert_eq!(clock.elapsed_ms(Instant::now()), 0.0);
    }
}
