//! Playback through an external player process.

use std::io::{Cursor, Write};
use std::process::{Child, Command, Stdio};

use tempfile::NamedTempFile;

use crate::api::download;

use super::PlaybackError;
use super::controller::AudioSink;

/// Player program and its leading arguments; the audio path is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlayerCommand {
    /// Parse a whitespace-separated command line such as `ffplay -nodisp -autoexit`.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Platform default player.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                program: "afplay".to_string(),
                args: Vec::new(),
            }
        } else {
            Self {
                program: "ffplay".to_string(),
                args: ["-nodisp", "-autoexit", "-loglevel", "quiet"]
                    .map(str::to_string)
                    .to_vec(),
            }
        }
    }
}

/// Format details of a WAV payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
}

/// Inspect a WAV payload. Returns `None` for anything that is not WAV.
pub fn wav_info(bytes: &[u8]) -> Option<WavInfo> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();
    // `duration` counts frames, i.e. samples per channel.
    let frames = reader.duration();

    Some(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs: frames as f64 / spec.sample_rate as f64,
    })
}

/// Audio downloaded to a temp file and played by a child process.
pub struct ProcessSink {
    file: NamedTempFile,
    player: PlayerCommand,
    child: Option<Child>,
    info: Option<WavInfo>,
}

impl ProcessSink {
    /// Download `url` and prepare it for playback.
    pub fn open(url: &str, player: PlayerCommand) -> Result<Self, PlaybackError> {
        let bytes = download(url)?;
        Self::from_bytes(&bytes, player)
    }

    pub fn from_bytes(bytes: &[u8], player: PlayerCommand) -> Result<Self, PlaybackError> {
        let info = wav_info(bytes);
        let suffix = if info.is_some() { ".wav" } else { ".mp3" };

        let mut file = tempfile::Builder::new()
            .prefix("speechix-")
            .suffix(suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self {
            file,
            player,
            child: None,
            info,
        })
    }

    pub fn info(&self) -> Option<&WavInfo> {
        self.info.as_ref()
    }
}

impl AudioSink for ProcessSink {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.stop();

        let child = Command::new(&self.player.program)
            .args(&self.player.args)
            .arg(self.file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::PlayerFailed(format!("{}: {e}", self.player.program)))?;

        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Already exited is fine.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_playing(&mut self) -> bool {
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for ProcessSink {
    fn drop(&mut self) {
        self.stop();
    }
}
