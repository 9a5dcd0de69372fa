//! Tracks

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clip::{AudioSource, Clip, ClipContent, TimeRange};
use super::plugin::PluginChain;
use super::source::SourceReference;
use super::InsertPoint;
use crate::error::Result;

/// A named container of clips and a plugin chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier for this track.
    pub id: Uuid,

    /// Display name. Not unique: lookups take the first match.
    pub name: String,

    /// Clips in insertion order.
    #[serde(default)]
    clips: Vec<Clip>,

    /// Plugin processing chain.
    #[serde(default)]
    plugins: PluginChain,
}

impl Track {
    /// Create an empty track
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            clips: Vec::new(),
            plugins: PluginChain::default(),
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clips_mut(&mut self) -> &mut [Clip] {
        &mut self.clips
    }

    /// Get a clip by ID
    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Get a mutable clip by ID
    pub fn clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginChain {
        &mut self.plugins
    }

    /// Append an empty MIDI clip.
    pub fn insert_midi_clip(&mut self, name: &str, range: TimeRange) -> &mut Clip {
        self.push_clip(Clip::new(name, range, ClipContent::Midi(Default::default())))
    }

    /// Append an audio clip whose length is read from the WAV file at `file`.
    ///
    /// The clip's source descriptor is `file` exactly as given.
    pub fn insert_audio_clip(&mut self, name: &str, file: &Path, start: f64) -> Result<&mut Clip> {
        let mut audio = AudioSource::new(SourceReference::new(file.to_string_lossy()));
        let duration = audio.media_info(file)?.duration_secs();
        let range = TimeRange::new(start, start + duration);
        Ok(self.push_clip(Clip::new(name, range, ClipContent::Audio(audio))))
    }

    /// Append an audio clip with an arbitrary source descriptor and range.
    pub fn insert_audio_reference(
        &mut self,
        name: &str,
        source: SourceReference,
        range: TimeRange,
    ) -> &mut Clip {
        let audio = AudioSource::new(source);
        self.push_clip(Clip::new(name, range, ClipContent::Audio(audio)))
    }

    /// Insert a clip at a position in the clip list.
    pub fn insert_clip(&mut self, clip: Clip, at: InsertPoint) -> &mut Clip {
        let index = at.index_in(self.clips.len());
        self.clips.insert(index, clip);
        &mut self.clips[index]
    }

    /// Remove a clip by ID
    pub fn remove_clip(&mut self, id: Uuid) -> Option<Clip> {
        let index = self.clips.iter().position(|c| c.id == id)?;
        Some(self.clips.remove(index))
    }

    fn push_clip(&mut self, clip: Clip) -> &mut Clip {
        self.insert_clip(clip, InsertPoint::End)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::ClipKind;

    #[test]
    fn test_clip_order() {
        let mut track = Track::new("keys");
        track.insert_midi_clip("a", TimeRange::new(0.0, 4.0));
        track.insert_audio_reference("b", SourceReference::new("/tmp/b.wav"), TimeRange::new(4.0, 8.0));
        let first = Clip::new("c", TimeRange::new(0.0, 1.0), ClipContent::Midi(Default::default()));
        track.insert_clip(first, InsertPoint::At(0));

        let names: Vec<&str> = track.clips().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(track.clips()[2].kind(), ClipKind::Audio);
    }

    #[test]
    fn test_remove_clip() {
        let mut track = Track::new("keys");
        let id = track.insert_midi_clip("a", TimeRange::new(0.0, 4.0)).id;
        assert!(track.clip(id).is_some());
        assert!(track.remove_clip(id).is_some());
        assert!(track.clip(id).is_none());
    }
}
