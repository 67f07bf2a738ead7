//! Headless playback channel.
//!
//! `MemoryChannel` keeps channel state in memory and appends every command to
//! a shared `CommandLog`, so the tuner can run without an audio device (CLI
//! `--headless`) and tests can check exactly which commands were issued.

use crate::channel::PlaybackChannel;
use crate::error::{Result, TunerError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A command received by a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCommand {
    Load(PathBuf),
    Play,
    Stop,
    Seek(Duration),
    SetGain(f32),
}

/// A command tagged with the channel that received it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub channel: String,
    pub command: ChannelCommand,
}

/// Ordered record of commands, shareable between channels.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    events: Arc<Mutex<Vec<ChannelEvent>>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, channel: &str, command: ChannelCommand) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ChannelEvent {
                channel: channel.to_string(),
                command,
            });
    }

    /// Copy of every command received so far.
    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Shared switch that makes a channel behave like an unreachable backend.
#[derive(Debug, Clone, Default)]
pub struct Outage {
    down: Arc<AtomicBool>,
}

impl Outage {
    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::Relaxed)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::Relaxed);
    }
}

/// In-memory channel. Playback position does not advance on its own.
#[derive(Debug)]
pub struct MemoryChannel {
    label: String,
    log: CommandLog,
    outage: Outage,
    asset: Option<PathBuf>,
    playing: bool,
    gain_db: f32,
    position: Duration,
}

impl MemoryChannel {
    pub fn new(label: impl Into<String>, log: CommandLog) -> Self {
        MemoryChannel {
            label: label.into(),
            log,
            outage: Outage::default(),
            asset: None,
            playing: false,
            gain_db: 0.0,
            position: Duration::ZERO,
        }
    }

    /// Handle for simulating a backend outage after the channel is handed off.
    pub fn outage(&self) -> Outage {
        self.outage.clone()
    }

    pub fn asset(&self) -> Option<&Path> {
        self.asset.as_deref()
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    fn check_up(&self, action: &str) -> Result<()> {
        if self.outage.is_down() {
            Err(TunerError::channel(
                &self.label,
                format!("backend down, cannot {}", action),
            ))
        } else {
            Ok(())
        }
    }
}

impl PlaybackChannel for MemoryChannel {
    fn load(&mut self, asset: &Path) -> Result<()> {
        self.log
            .push(&self.label, ChannelCommand::Load(asset.to_path_buf()));
        self.check_up("load")?;
        self.asset = Some(asset.to_path_buf());
        self.playing = false;
        self.position = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.log.push(&self.label, ChannelCommand::Play);
        self.check_up("play")?;
        if self.asset.is_none() {
            return Err(TunerError::channel(&self.label, "nothing loaded"));
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.push(&self.label, ChannelCommand::Stop);
        self.playing = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.log.push(&self.label, ChannelCommand::Seek(position));
        self.check_up("seek")?;
        self.position = position;
        Ok(())
    }

    fn set_gain(&mut self, gain_db: f32) -> Result<()> {
        self.log.push(&self.label, ChannelCommand::SetGain(gain_db));
        self.gain_db = gain_db;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<MemoryChannel>();
    }

    #[test]
    fn commands_are_logged_in_order() {
        let log = CommandLog::new();
        let mut ch = MemoryChannel::new("station", log.clone());
        ch.load(Path::new("a.mp3")).unwrap();
        ch.play().unwrap();
        ch.seek(Duration::from_secs(3)).unwrap();
        ch.set_gain(-4.0).unwrap();

        let commands: Vec<ChannelCommand> = log.events().into_iter().map(|e| e.command).collect();
        assert_eq!(
            commands,
            vec![
                ChannelCommand::Load(PathBuf::from("a.mp3")),
                ChannelCommand::Play,
                ChannelCommand::Seek(Duration::from_secs(3)),
                ChannelCommand::SetGain(-4.0),
            ]
        );
        assert!(ch.is_playing());
        assert_eq!(ch.position(), Duration::from_secs(3));
        assert_eq!(ch.gain_db(), -4.0);
    }

    #[test]
    fn play_and_stop_are_idempotent() {
        let mut ch = MemoryChannel::new("noise", CommandLog::new());
        ch.load(Path::new("noise.mp3")).unwrap();
        ch.stop().unwrap();
        ch.stop().unwrap();
        assert!(!ch.is_playing());
        ch.play().unwrap();
        ch.play().unwrap();
        assert!(ch.is_playing());
    }

    #[test]
    fn play_without_asset_fails() {
        let mut ch = MemoryChannel::new("station", CommandLog::new());
        assert!(matches!(
            ch.play(),
            Err(TunerError::ChannelUnavailable { .. })
        ));
    }

    #[test]
    fn outage_fails_load_and_play() {
        let mut ch = MemoryChannel::new("station", CommandLog::new());
        let outage = ch.outage();
        outage.set_down(true);
        assert!(ch.load(Path::new("a.mp3")).is_err());
        assert!(ch.asset().is_none());

        outage.set_down(false);
        ch.load(Path::new("a.mp3")).unwrap();
        assert_eq!(ch.asset(), Some(Path::new("a.mp3")));
    }

    #[test]
    fn shared_log_tags_channels() {
        let log = CommandLog::new();
        let mut noise = MemoryChannel::new("noise", log.clone());
        let mut station = MemoryChannel::new("station", log.clone());
        noise.stop().unwrap();
        station.stop().unwrap();

        let channels: Vec<String> = log.events().into_iter().map(|e| e.channel).collect();
        assert_eq!(channels, vec!["noise", "station"]);
        log.clear();
        assert!(log.is_empty());
    }
}
