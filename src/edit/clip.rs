//! Clips
//!
//! A clip is a time-bounded unit of content on a track: either a MIDI note
//! sequence or a reference to an audio file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::source::SourceReference;
use crate::error::{FluidError, Result};

/// Start/end of a clip on the timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Discriminant of [`ClipContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Midi,
    Audio,
}

/// A single MIDI note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// MIDI channel (1-16)
    pub channel: u8,
    /// Start position within the clip, in beats
    pub start_beat: f64,
    /// Note-on velocity (0-127)
    pub velocity: u8,
    /// Length in beats
    pub length_beats: f64,
}

impl MidiNote {
    pub fn new(pitch: u8, channel: u8, start_beat: f64, velocity: u8, length_beats: f64) -> Self {
        Self {
            pitch,
            channel,
            start_beat,
            velocity,
            length_beats,
        }
    }
}

/// Notes of a MIDI clip, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MidiSequence {
    #[serde(default)]
    notes: Vec<MidiNote>,
}

impl MidiSequence {
    pub fn notes(&self) -> &[MidiNote] {
        &self.notes
    }

    pub fn add_note(&mut self, note: MidiNote) {
        self.notes.push(note);
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

/// Header information of an audio file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub num_frames: u32,
}

impl MediaInfo {
    /// Read the header of a WAV file.
    pub fn read(file: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(file).map_err(|e| FluidError::InvalidAudio {
            path: file.to_path_buf(),
            reason: e.to_string(),
        })?;
        let spec = reader.spec();
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            num_frames: reader.duration(),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames as f64 / self.sample_rate as f64
    }
}

/// Audio clip content: a source reference plus cached media information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSource {
    /// Where the audio data lives.
    pub source: SourceReference,

    /// Header of the referenced file, read lazily.
    #[serde(skip)]
    media: Option<MediaInfo>,

    /// Bumped every time the source changes.
    #[serde(skip)]
    media_generation: u64,
}

impl AudioSource {
    pub fn new(source: SourceReference) -> Self {
        Self {
            source,
            media: None,
            media_generation: 0,
        }
    }

    /// Media information for `file`, reading the header on first access.
    pub fn media_info(&mut self, file: &Path) -> Result<&MediaInfo> {
        let info = match self.media {
            Some(info) => info,
            None => MediaInfo::read(file)?,
        };
        Ok(self.media.insert(info))
    }

    /// Cached media information, if it has been read.
    pub fn cached_media(&self) -> Option<&MediaInfo> {
        self.media.as_ref()
    }

    /// Notify that the source reference changed; drops anything derived from it.
    pub fn source_media_changed(&mut self) {
        self.media = None;
        self.media_generation += 1;
    }

    pub fn media_generation(&self) -> u64 {
        self.media_generation
    }
}

/// What a clip holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipContent {
    Midi(MidiSequence),
    Audio(AudioSource),
}

/// A clip on a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Unique identifier for this clip.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Position on the timeline.
    pub range: TimeRange,

    /// MIDI notes or audio reference.
    pub content: ClipContent,
}

impl Clip {
    pub fn new(name: &str, range: TimeRange, content: ClipContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            range,
            content,
        }
    }

    pub fn kind(&self) -> ClipKind {
        match self.content {
            ClipContent::Midi(_) => ClipKind::Midi,
            ClipContent::Audio(_) => ClipKind::Audio,
        }
    }

    pub fn sequence(&self) -> Option<&MidiSequence> {
        match &self.content {
            ClipContent::Midi(sequence) => Some(sequence),
            ClipContent::Audio(_) => None,
        }
    }

    pub fn sequence_mut(&mut self) -> Option<&mut MidiSequence> {
        match &mut self.content {
            ClipContent::Midi(sequence) => Some(sequence),
            ClipContent::Audio(_) => None,
        }
    }

    pub fn audio(&self) -> Option<&AudioSource> {
        match &self.content {
            ClipContent::Audio(audio) => Some(audio),
            ClipContent::Midi(_) => None,
        }
    }

    pub fn audio_mut(&mut self) -> Option<&mut AudioSource> {
        match &mut self.content {
            ClipContent::Audio(audio) => Some(audio),
            ClipContent::Midi(_) => None,
        }
    }
}
