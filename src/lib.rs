//! radio_tuner — core library for the analog radio tuner.
//!
//! Station selection, the station/static crossfade and the always-on-air
//! broadcast clock live here. The CLI drives a single shared `Tuner`.

pub mod amplitude;
pub mod band;
pub mod catalog;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod headless;
pub mod player;
pub mod station;
pub mod status;
pub mod tuner;

pub use error::{Result, TunerError};
pub use tuner::Tuner;
