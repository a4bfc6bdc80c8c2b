//! Audio cues and the sinks that play them.
//!
//! Game logic only ever names a [`Cue`]; what happens next is the sink's
//! business. A failed cue is logged and skipped, never propagated: audio is
//! best-effort and must not stall the game.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

/// Symbolic audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Wake,
    Sleep,
    Everyone,
    Mafia,
    Doctor,
    Detective,
    Lynch,
    Protection,
    Hint,
}

impl Cue {
    pub const ALL: [Cue; 9] = [
        Cue::Wake,
        Cue::Sleep,
        Cue::Everyone,
        Cue::Mafia,
        Cue::Doctor,
        Cue::Detective,
        Cue::Lynch,
        Cue::Protection,
        Cue::Hint,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Cue::Wake => "wake",
            Cue::Sleep => "sleep",
            Cue::Everyone => "everyone",
            Cue::Mafia => "mafia",
            Cue::Doctor => "doctor",
            Cue::Detective => "detective",
            Cue::Lynch => "lynch",
            Cue::Protection => "protection",
            Cue::Hint => "hint",
        }
    }

    /// Earcon file name without the `.mp3` extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            Cue::Wake => "wakeUpSound",
            Cue::Sleep => "gotoSleepSound",
            Cue::Everyone => "everyoneSound",
            Cue::Mafia => "mafiaSound",
            Cue::Doctor => "doctorSound",
            Cue::Detective => "detectiveSound",
            Cue::Lynch => "lynchSound",
            Cue::Protection => "protectSound",
            Cue::Hint => "checkSound",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sound not loaded: {0}")]
    NotLoaded(Cue),

    #[error("empty audio player command")]
    EmptyCommand,

    #[error("failed to start audio player '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("audio player exited with {status} while playing '{cue}'")]
    Failed { cue: Cue, status: ExitStatus },
}

/// Something that can play a cue to the room.
///
/// `play` returns once playback has finished.
#[async_trait::async_trait]
pub trait FeedbackSink: Send {
    async fn play(&mut self, cue: Cue) -> Result<(), SinkError>;
}

// ── SilentSink ──────────────────────────────────────────────────────

/// Plays nothing. Used with `--no-sound` and when no player is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

#[async_trait::async_trait]
impl FeedbackSink for SilentSink {
    async fn play(&mut self, cue: Cue) -> Result<(), SinkError> {
        tracing::debug!("cue (silent): {cue}");
        Ok(())
    }
}

// ── CommandSink ─────────────────────────────────────────────────────

/// Plays `<sound_dir>/<stem>.mp3` by running an external player
/// (e.g. `mpg123 -q`) and waiting for it to exit.
#[derive(Debug)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    sounds: HashMap<Cue, PathBuf>,
}

impl CommandSink {
    /// Split `command_line` on whitespace and look up every earcon in
    /// `sound_dir`. Missing files are reported here, once.
    pub fn new(command_line: &str, sound_dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(SinkError::EmptyCommand)?;
        let args = words.collect();

        let sound_dir = sound_dir.as_ref();
        tracing::info!("loading sounds from {}", sound_dir.display());

        let mut sounds = HashMap::new();
        for cue in Cue::ALL {
            let path = sound_dir.join(format!("{}.mp3", cue.file_stem()));
            if path.is_file() {
                sounds.insert(cue, path);
            } else {
                tracing::warn!("sound not found: {}", path.display());
            }
        }

        Ok(Self {
            program,
            args,
            sounds,
        })
    }

    /// Cues with no earcon file.
    pub fn missing(&self) -> Vec<Cue> {
        Cue::ALL
            .into_iter()
            .filter(|cue| !self.sounds.contains_key(cue))
            .collect()
    }
}

#[async_trait::async_trait]
impl FeedbackSink for CommandSink {
    async fn play(&mut self, cue: Cue) -> Result<(), SinkError> {
        let path = self.sounds.get(&cue).ok_or(SinkError::NotLoaded(cue))?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| SinkError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(SinkError::Failed { cue, status });
        }
        Ok(())
    }
}

// ── SoundBoard ──────────────────────────────────────────────────────

/// The orchestrator's handle on audio: a sink plus an on/off switch.
pub struct SoundBoard {
    sink: Box<dyn FeedbackSink>,
    enabled: bool,
}

impl SoundBoard {
    pub fn new(sink: Box<dyn FeedbackSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Play one cue; failures are logged and dropped.
    pub async fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.sink.play(cue).await {
            tracing::warn!("cue '{cue}' not delivered: {e}");
        }
    }

    pub async fn play_sequence(&mut self, cues: &[Cue]) {
        for &cue in cues {
            self.play(cue).await;
        }
    }
}

// ── RecordingSink (tests) ───────────────────────────────────────────
