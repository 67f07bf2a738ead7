//! Tuning-dial gain curve.
//!
//! Maps the distance between the dial and the nearest station onto a pair of
//! preamp gains in decibels, one for the station track and one for static:
//!
//! - locked band (`d <= width/2`): station at +20 dB, static at -20 dB
//! - fade band (`width/2 < d <= width/2 + fade_range`): linear crossfade
//! - static band (beyond): station at -20 dB, static at +20 dB

use serde::{Deserialize, Serialize};

/// Upper end of the symmetric preamp range.
pub const PREAMP_MAX_DB: f32 = 20.0;
/// Lower end of the symmetric preamp range.
pub const PREAMP_MIN_DB: f32 = -PREAMP_MAX_DB;

/// Shape of the crossfade between a station and static.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainCurve {
    /// Width in MHz of the band heard with no static at all.
    pub station_width: f64,
    /// Width in MHz of the fade on either side of the locked band.
    pub fade_range: f64,
}

impl Default for GainCurve {
    fn default() -> Self {
        GainCurve {
            station_width: 0.1,
            fade_range: 0.5,
        }
    }
}

/// Gains for both channels, in preamp decibels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub station_db: f32,
    pub noise_db: f32,
}

impl Gains {
    /// Station at full gain: the static channel can be stopped.
    pub fn fully_tuned(&self) -> bool {
        self.station_db >= PREAMP_MAX_DB
    }

    /// Station at minimum gain: the station channel can be stopped.
    pub fn fully_detuned(&self) -> bool {
        self.station_db <= PREAMP_MIN_DB
    }
}

impl GainCurve {
    /// Distance at which static takes over completely.
    pub fn static_edge(&self) -> f64 {
        self.station_width / 2.0 + self.fade_range
    }

    /// Station level in `[0, 1]` for a distance in MHz.
    pub fn level(&self, distance: f64) -> f64 {
        let locked_edge = self.station_width / 2.0;
        if distance <= locked_edge {
            return 1.0;
        }
        if self.fade_range <= 0.0 {
            return 0.0;
        }
        (1.0 - (distance - locked_edge) / self.fade_range).clamp(0.0, 1.0)
    }

    /// Complementary station/static gains for a distance in MHz.
    pub fn gain(&self, distance: f64) -> Gains {
        let amp = self.level(distance) as f32 * (PREAMP_MAX_DB - PREAMP_MIN_DB) + PREAMP_MIN_DB;
        Gains {
            station_db: amp,
            noise_db: -amp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_station_is_full_gain() {
        let g = GainCurve::default().gain(0.0);
        assert_eq!(g.station_db, PREAMP_MAX_DB);
        assert_eq!(g.noise_db, PREAMP_MIN_DB);
        assert!(g.fully_tuned());
        assert!(!g.fully_detuned());
    }

    #[test]
    fn locked_band_edge_is_still_full_gain() {
        let g = GainCurve::default().gain(0.05);
        assert!(g.fully_tuned());
    }

    #[test]
    fn beyond_fade_is_full_static() {
        let curve = GainCurve::default();
        for d in [0.55, 0.6, 1.0, 7.4, 100.0] {
            let g = curve.gain(d);
            assert_eq!(g.station_db, PREAMP_MIN_DB, "distance {}", d);
            assert_eq!(g.noise_db, PREAMP_MAX_DB, "distance {}", d);
            assert!(g.fully_detuned());
        }
    }

    #[test]
    fn midpoint_of_fade_is_balanced() {
        let g = GainCurve::default().gain(0.3);
        assert!(g.station_db.abs() < 1e-4);
        assert!(g.noise_db.abs() < 1e-4);
        assert!(!g.fully_tuned());
        assert!(!g.fully_detuned());
    }

    #[test]
    fn gains_are_monotonic_with_distance() {
        let curve = GainCurve::default();
        let mut prev = curve.gain(0.0);
        let mut d = 0.0;
        while d <= 0.6 {
            let g = curve.gain(d);
            assert!(g.station_db <= prev.station_db, "station rose at {}", d);
            assert!(g.noise_db >= prev.noise_db, "noise fell at {}", d);
            assert_eq!(g.station_db, -g.noise_db);
            prev = g;
            d += 0.005;
        }
    }

    #[test]
    fn zero_fade_range_is_a_hard_edge() {
        let curve = GainCurve {
            station_width: 0.2,
            fade_range: 0.0,
        };
        assert!(curve.gain(0.1).fully_tuned());
        assert!(curve.gain(0.11).fully_detuned());
    }

    #[test]
    fn static_edge_matches_defaults() {
        assert!((GainCurve::default().static_edge() - 0.55).abs() < 1e-12);
    }

    #[test]
    fn steeper_curve_is_reachable_from_settings() {
        // clamp01(1.2 - 2.4d): full up to 1/12 MHz, silent from 0.5 MHz
        let curve = GainCurve {
            station_width: 0.4 / 2.4,
            fade_range: 1.0 / 2.4,
        };
        let mut d: f64 = 0.0;
        while d <= 0.7 {
            let expected = ((1.2 - 2.4 * d).clamp(0.0, 1.0) * 40.0 - 20.0) as f32;
            let g = curve.gain(d);
            assert!((g.station_db - expected).abs() < 1e-3, "distance {}", d);
            d += 0.01;
        }
        assert!((curve.gain(0.3).station_db + 0.8).abs() < 1e-3);
        assert!((curve.static_edge() - 0.5).abs() < 1e-12);
    }
}
