use crate::amplitude::{PREAMP_MAX_DB, PREAMP_MIN_DB};
use crate::channel::PlaybackChannel;
use crate::error::{Result, TunerError};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Open audio output device. Must outlive every channel created from it and
/// stay on the thread that opened it.
pub struct AudioOutput {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Open the default output device.
    pub fn open() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            TunerError::channel("output", format!("Failed to open audio output: {}", e))
        })?;
        Ok(AudioOutput {
            _stream: stream,
            stream_handle: handle,
        })
    }

    /// Create an independent channel on this output.
    pub fn channel(&self, label: impl Into<String>) -> Result<SinkChannel> {
        let label = label.into();
        let sink = new_sink(&self.stream_handle, &label)?;
        Ok(SinkChannel {
            label,
            stream_handle: self.stream_handle.clone(),
            sink,
            asset: None,
            playing: false,
            volume: 1.0,
        })
    }
}

/// Playback channel backed by a rodio sink.
///
/// Tracks loop forever: the queue holds a seekable decoder followed by an
/// endlessly repeating copy of the same asset.
pub struct SinkChannel {
    label: String,
    stream_handle: OutputStreamHandle,
    sink: Sink,
    asset: Option<PathBuf>,
    playing: bool,
    volume: f32,
}

impl PlaybackChannel for SinkChannel {
    fn load(&mut self, asset: &Path) -> Result<()> {
        // Decode once up front so a bad asset fails here and not on play()
        open_source(asset).map_err(|e| TunerError::channel(&self.label, e))?;
        self.stop()?;
        self.asset = Some(asset.to_path_buf());
        debug!(channel = %self.label, asset = %asset.display(), "loaded");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }
        let asset = self
            .asset
            .clone()
            .ok_or_else(|| TunerError::channel(&self.label, "nothing loaded"))?;

        // A stopped sink drops its queue; start over on a fresh one.
        let sink = new_sink(&self.stream_handle, &self.label)?;
        let first = open_source(&asset).map_err(|e| TunerError::channel(&self.label, e))?;
        let rest = open_source(&asset).map_err(|e| TunerError::channel(&self.label, e))?;
        sink.append(first);
        sink.append(rest.repeat_infinite());
        sink.set_volume(self.volume);
        sink.play();

        self.sink = sink;
        self.playing = true;
        debug!(channel = %self.label, "playing");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.playing {
            self.sink.stop();
            self.playing = false;
            debug!(channel = %self.label, "stopped");
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing && !self.sink.empty() && !self.sink.is_paused()
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        if !self.playing {
            return Err(TunerError::channel(&self.label, "cannot seek while stopped"));
        }
        self.sink
            .try_seek(position)
            .map_err(|e| TunerError::channel(&self.label, format!("Seek failed: {}", e)))?;
        debug!(channel = %self.label, position_ms = position.as_millis() as u64, "seeked");
        Ok(())
    }

    fn set_gain(&mut self, gain_db: f32) -> Result<()> {
        self.volume = preamp_to_volume(gain_db);
        self.sink.set_volume(self.volume);
        Ok(())
    }
}

fn new_sink(handle: &OutputStreamHandle, label: &str) -> Result<Sink> {
    Sink::try_new(handle)
        .map_err(|e| TunerError::channel(label, format!("Failed to create sink: {}", e)))
}

fn open_source(path: &Path) -> std::result::Result<Decoder<BufReader<File>>, String> {
    let file = File::open(path).map_err(|e| format!("Cannot open '{}': {}", path.display(), e))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| format!("Cannot decode '{}': {}", path.display(), e))
}

/// Map preamp decibels linearly onto sink volume: -20 dB is silent, +20 dB is
/// full volume.
pub fn preamp_to_volume(gain_db: f32) -> f32 {
    let clamped = gain_db.clamp(PREAMP_MIN_DB, PREAMP_MAX_DB);
    (clamped - PREAMP_MIN_DB) / (PREAMP_MAX_DB - PREAMP_MIN_DB)
}
