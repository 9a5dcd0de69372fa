//! Edit Document
//!
//! The in-memory project document: an ordered list of tracks, each owning its
//! clips and plugin chain. Entities are addressed by UUID rather than by
//! pointers back into the tree, so a track can be removed without leaving
//! dangling references behind.
//!
//! ```text
//! Edit
//!  └─ Track ("drums")
//!      ├─ clips:   [Clip (midi), Clip (audio → SourceReference)]
//!      └─ plugins: [Plugin (internal "reverb"), Plugin (internal "volume")]
//! ```

pub mod clip;
pub mod plugin;
pub mod source;
pub mod track;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FluidError, Result};

pub use clip::{AudioSource, Clip, ClipContent, ClipKind, MediaInfo, MidiNote, MidiSequence, TimeRange};
pub use plugin::{
    insertion_point, Plugin, PluginChain, PluginIdentity, DEFAULT_MAX_PLUGINS,
    INTERNAL_PLUGIN_FORMAT, VOLUME_PLUGIN_TYPE,
};
pub use source::{
    absolute_path, PathMode, PathResolver, ProjectItemId, ProjectLibrary, SourceReference,
    SourceResolver,
};
pub use track::Track;

/// Where to insert into an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPoint {
    /// Insert before the element currently at this index
    At(usize),
    /// Append after the last element
    End,
}

impl InsertPoint {
    /// Concrete index for a sequence of `len` elements. Out-of-range indices append.
    pub fn index_in(self, len: usize) -> usize {
        match self {
            InsertPoint::At(index) => index.min(len),
            InsertPoint::End => len,
        }
    }
}

/// The project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    /// Stable identifier for this edit.
    pub id: Uuid,

    /// Timestamp when the edit was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of last modification.
    pub modified_at: DateTime<Utc>,

    /// Maximum number of plugins on any one track.
    #[serde(default = "default_plugin_capacity")]
    plugin_capacity: usize,

    /// Tracks in document order.
    #[serde(default)]
    tracks: Vec<Track>,

    /// File this edit is stored in (not serialized). Relative sources are
    /// resolved against its directory.
    #[serde(skip)]
    edit_file: Option<PathBuf>,
}

fn default_plugin_capacity() -> usize {
    DEFAULT_MAX_PLUGINS
}

impl Edit {
    /// Create an empty edit with no backing file.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            modified_at: now,
            plugin_capacity: DEFAULT_MAX_PLUGINS,
            tracks: Vec::new(),
            edit_file: None,
        }
    }

    /// Create an empty edit that will be stored at `path`.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let mut edit = Self::new();
        edit.set_edit_file(path);
        edit
    }

    /// Load an edit from a JSON file. Sources are left exactly as stored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FluidError::EditNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| FluidError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut edit: Edit = serde_json::from_str(&content)?;
        edit.set_edit_file(path);
        let capacity = edit.plugin_capacity;
        for track in &mut edit.tracks {
            track.plugins_mut().set_capacity(capacity);
        }
        Ok(edit)
    }

    /// Write the edit as JSON to `path`, exactly as it currently is.
    pub fn write_to(&mut self, path: &Path) -> Result<()> {
        self.modified_at = Utc::now();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FluidError::FileWriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| FluidError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// File this edit is anchored to, if any.
    pub fn edit_file(&self) -> Option<&Path> {
        self.edit_file.as_deref()
    }

    /// Re-anchor the edit. Relative sources resolve differently afterwards.
    ///
    /// A relative `path` is taken from the process working directory.
    pub fn set_edit_file(&mut self, path: impl Into<PathBuf>) {
        self.edit_file = Some(absolute_path(&path.into()));
    }

    /// Detach the edit from any file.
    pub fn clear_edit_file(&mut self) {
        self.edit_file = None;
    }

    /// Directory that relative sources are resolved against.
    pub fn edit_dir(&self) -> Option<&Path> {
        self.edit_file.as_deref().and_then(Path::parent)
    }

    /// Plugin capacity applied to every track.
    pub fn plugin_capacity(&self) -> usize {
        self.plugin_capacity
    }

    /// Change the plugin capacity of existing and future tracks.
    pub fn set_plugin_capacity(&mut self, capacity: usize) {
        self.plugin_capacity = capacity;
        for track in &mut self.tracks {
            track.plugins_mut().set_capacity(capacity);
        }
    }

    /// Tracks in document order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Mutable access to tracks in document order.
    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    /// Get a track by ID
    pub fn track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Get a mutable track by ID
    pub fn track_mut(&mut self, id: Uuid) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Insert a new, empty track named `name`.
    pub fn insert_track(&mut self, name: &str, at: InsertPoint) -> &mut Track {
        let mut track = Track::new(name);
        track.plugins_mut().set_capacity(self.plugin_capacity);
        let index = at.index_in(self.tracks.len());
        self.tracks.insert(index, track);
        self.modified_at = Utc::now();
        &mut self.tracks[index]
    }

    /// Remove a track and everything it owns.
    pub fn remove_track(&mut self, id: Uuid) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        self.modified_at = Utc::now();
        Some(self.tracks.remove(index))
    }

    /// Number of audio clips across all tracks.
    pub fn audio_clip_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| t.clips())
            .filter(|c| c.kind() == ClipKind::Audio)
            .count()
    }
}

impl Default for Edit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_point_index() {
        assert_eq!(InsertPoint::End.index_in(3), 3);
        assert_eq!(InsertPoint::At(1).index_in(3), 1);
        assert_eq!(InsertPoint::At(9).index_in(3), 3);
    }

    #[test]
    fn test_insert_and_remove_track() {
        let mut edit = Edit::new();
        let a = edit.insert_track("a", InsertPoint::End).id;
        let b = edit.insert_track("b", InsertPoint::At(0)).id;

        let names: Vec<&str> = edit.tracks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);

        assert!(edit.remove_track(b).is_some());
        assert!(edit.remove_track(b).is_none());
        assert_eq!(edit.tracks().len(), 1);
        assert_eq!(edit.tracks()[0].id, a);
    }

    #[test]
    fn test_plugin_capacity_applies_to_tracks() {
        let mut edit = Edit::new();
        edit.insert_track("a", InsertPoint::End);
        edit.set_plugin_capacity(2);
        edit.insert_track("b", InsertPoint::End);

        for track in edit.tracks() {
            assert_eq!(track.plugins().capacity(), 2);
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sessions").join("song.json");

        let mut edit = Edit::with_file(&path);
        edit.set_plugin_capacity(4);
        edit.insert_track("bass", InsertPoint::End)
            .insert_midi_clip("verse", TimeRange::new(0.0, 4.0));
        edit.write_to(&path).unwrap();

        let loaded = Edit::load(&path).unwrap();
        assert_eq!(loaded.id, edit.id);
        assert_eq!(loaded.edit_file(), Some(path.as_path()));
        assert_eq!(loaded.tracks().len(), 1);
        assert_eq!(loaded.tracks()[0].clips()[0].name, "verse");
        assert_eq!(loaded.tracks()[0].plugins().capacity(), 4);
    }

    #[test]
    fn test_relative_edit_file_is_anchored() {
        let cwd = std::env::current_dir().unwrap();
        let edit = Edit::with_file("edits/song.json");
        assert_eq!(edit.edit_file(), Some(cwd.join("edits").join("song.json").as_path()));
        assert_eq!(edit.edit_dir(), Some(cwd.join("edits").as_path()));
    }

    #[test]
    fn test_load_missing_edit() {
        let temp_dir = TempDir::new().unwrap();
        let err = Edit::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.error_code(), "EDIT_NOT_FOUND");
    }
}
