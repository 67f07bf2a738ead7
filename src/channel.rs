//! PlaybackChannel — the contract the tuner needs from an audio backend.
//!
//! The tuner drives two channels (static and station track) and never looks
//! at their decode state. `play()` while playing and `stop()` while stopped
//! must be harmless no-ops. Gains are preamp decibels in
//! [`PREAMP_MIN_DB`, `PREAMP_MAX_DB`]; each backend maps them onto its own
//! volume scale.
//!
//! [`PREAMP_MIN_DB`]: crate::amplitude::PREAMP_MIN_DB
//! [`PREAMP_MAX_DB`]: crate::amplitude::PREAMP_MAX_DB

use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// One independently controllable audio output, static or a station track.
pub trait PlaybackChannel: Send {
    /// Replace the loaded asset. Stops current playback.
    fn load(&mut self, asset: &Path) -> Result<()>;

    /// Start (or restart) the loaded asset.
    fn play(&mut self) -> Result<()>;

    /// Halt playback. The loaded asset stays loaded.
    fn stop(&mut self) -> Result<()>;

    /// Whether the channel is currently producing sound.
    fn is_playing(&self) -> bool;

    /// Jump to a position within the loaded asset.
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Set the preamp gain in dB. Applies to stopped channels too.
    fn set_gain(&mut self, gain_db: f32) -> Result<()>;
}
