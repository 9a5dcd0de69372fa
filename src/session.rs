//! Session
//!
//! Owns the active edit together with everything needed to work on it: the
//! plugin host, the project library and the current selection. At most one
//! edit is active at a time and every operation takes `&mut self`, so commands
//! against an edit are serialized by construction.
//!
//! In memory, audio clip sources are kept as absolute paths. They are only
//! made relative while writing an edit to disk.

use std::path::{Path, PathBuf};

use log::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::edit::{Clip, Edit, PathMode, Plugin, ProjectLibrary, Track};
use crate::error::{FluidError, Result};
use crate::host::PluginHost;
use crate::normalize::{normalize_sources, restore_absolute_sources, NormalizeReport};
use crate::resolve;

/// Most recently resolved entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub track: Option<Uuid>,
    pub clip: Option<Uuid>,
    pub plugin: Option<Uuid>,
}

/// The active edit and its collaborators.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    host: PluginHost,
    working_dir: PathBuf,
    edit: Option<Edit>,
    selection: Selection,
}

impl Session {
    /// Create a session with no active edit.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let working_dir = config.resolve_working_dir()?;
        let host = config.plugin_host();
        Ok(Self {
            config,
            host,
            working_dir,
            edit: None,
            selection: Selection::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &PluginHost {
        &self.host
    }

    pub fn library(&self) -> &ProjectLibrary {
        &self.config.project_items
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Directory that relative file arguments are joined onto.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve a file argument against the working directory.
    pub fn resolve_file(&self, file: &str) -> PathBuf {
        self.working_dir.join(file)
    }

    pub fn edit(&self) -> Option<&Edit> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut Edit> {
        self.edit.as_mut()
    }

    pub fn has_active_edit(&self) -> bool {
        self.edit.is_some()
    }

    /// Make a new, empty edit stored at `path` the active edit.
    pub fn create_edit(&mut self, path: impl Into<PathBuf>) -> &mut Edit {
        let mut edit = Edit::with_file(path);
        edit.set_plugin_capacity(self.config.max_plugins_per_track);
        self.activate(edit)
    }

    /// Make `edit` the active edit, replacing any previous one.
    pub fn set_active_edit(&mut self, mut edit: Edit) -> &mut Edit {
        edit.set_plugin_capacity(self.config.max_plugins_per_track);
        self.activate(edit)
    }

    /// Load the edit at `path` and make it active.
    ///
    /// All audio sources are converted to absolute paths. Sources that cannot
    /// be resolved are reported, not fatal.
    pub fn open_edit(&mut self, path: &Path) -> Result<NormalizeReport> {
        let mut edit = Edit::load(path)?;
        edit.set_plugin_capacity(self.config.max_plugins_per_track);

        let report = normalize_sources(&mut edit, &self.config.project_items, PathMode::Absolute);

        for plugin in edit.tracks().iter().flat_map(|t| t.plugins().iter()) {
            if !self.host.is_available(plugin) {
                warn!(
                    "Edit contains this plugin, which is missing from the host: {} ({})",
                    plugin.name(),
                    plugin.identity.format()
                );
            }
        }

        info!("Loaded edit file: {}", path.display());
        self.activate(edit);
        Ok(report)
    }

    /// Deactivate and return the current edit.
    pub fn close_edit(&mut self) -> Option<Edit> {
        self.selection = Selection::default();
        self.edit.take()
    }

    /// Write the active edit to `file` (or its own file), with sources in `mode`.
    ///
    /// The edit is re-anchored at the target file first, so relative sources
    /// are relative to where the edit is written. Sources are absolute again
    /// in memory afterwards.
    pub fn save_active_edit(&mut self, file: Option<&Path>, mode: PathMode) -> Result<NormalizeReport> {
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        let target = match file {
            Some(file) => file.to_path_buf(),
            None => edit.edit_file().ok_or(FluidError::NoEditFile)?.to_path_buf(),
        };

        let previous = edit.edit_file().map(Path::to_path_buf);
        edit.set_edit_file(&target);
        let report = normalize_sources(edit, &self.config.project_items, mode);
        let written = edit.write_to(&target);

        if mode.is_relative() {
            restore_absolute_sources(edit, &self.config.project_items);
        }

        if let Err(e) = written {
            match previous {
                Some(previous) => edit.set_edit_file(previous),
                None => edit.clear_edit_file(),
            }
            return Err(e);
        }

        info!("Saved edit ({} paths): {}", mode, target.display());
        Ok(report)
    }

    /// Normalize the active edit's sources in place.
    pub fn normalize_sources(&mut self, mode: PathMode) -> Result<NormalizeReport> {
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        Ok(normalize_sources(edit, &self.config.project_items, mode))
    }

    /// Resolve a track by name and select it.
    pub fn select_track(&mut self, name: &str) -> Result<&mut Track> {
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        let track = resolve::resolve_track(edit, name);
        if self.selection.track != Some(track.id) {
            self.selection = Selection {
                track: Some(track.id),
                ..Selection::default()
            };
        }
        Ok(track)
    }

    /// The track commands act on: the selected track, else the first track,
    /// else a new track with the configured default name.
    pub fn default_track(&mut self) -> Result<&mut Track> {
        let index = self.default_track_index()?;
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        Ok(&mut edit.tracks_mut()[index])
    }

    /// Resolve a MIDI clip on the default track and select it.
    pub fn select_midi_clip(&mut self, name: &str) -> Result<&mut Clip> {
        let index = self.default_track_index()?;
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        let clip = resolve::resolve_midi_clip(&mut edit.tracks_mut()[index], name);
        self.selection.clip = Some(clip.id);
        Ok(clip)
    }

    /// Resolve a plugin on the default track and select it.
    pub fn select_plugin(&mut self, name: &str, plugin_type: &str) -> Result<&mut Plugin> {
        let index = self.default_track_index()?;
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        let plugin = resolve::resolve_plugin(&mut edit.tracks_mut()[index], &self.host, name, plugin_type)?;
        self.selection.plugin = Some(plugin.id);
        Ok(plugin)
    }

    /// Append an audio clip for the WAV at `file` (relative to the working
    /// directory) to the default track.
    pub fn insert_audio_clip(&mut self, name: &str, file: &str, start: f64) -> Result<&mut Clip> {
        let path = self.resolve_file(file);
        let index = self.default_track_index()?;
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;
        let clip = edit.tracks_mut()[index].insert_audio_clip(name, &path, start)?;
        self.selection.clip = Some(clip.id);
        Ok(clip)
    }

    fn default_track_index(&mut self) -> Result<usize> {
        let edit = self.edit.as_mut().ok_or(FluidError::NoActiveEdit)?;

        let selected = self
            .selection
            .track
            .and_then(|id| edit.tracks().iter().position(|t| t.id == id));
        let index = match selected {
            Some(index) => index,
            None if !edit.tracks().is_empty() => 0,
            None => {
                resolve::resolve_track(edit, &self.config.default_track_name);
                edit.tracks().len() - 1
            }
        };

        let id = edit.tracks()[index].id;
        if self.selection.track != Some(id) {
            self.selection = Selection {
                track: Some(id),
                ..Selection::default()
            };
        }
        Ok(index)
    }

    fn activate(&mut self, edit: Edit) -> &mut Edit {
        self.selection = Selection::default();
        self.edit.insert(edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{InsertPoint, SourceReference, TimeRange};
    use crate::host::PluginDescription;
    use tempfile::TempDir;

    fn session_in(dir: &Path) -> Session {
        let config = EngineConfig {
            working_dir: Some(dir.to_path_buf()),
            ..EngineConfig::default()
        };
        Session::new(config).unwrap()
    }

    #[test]
    fn test_no_active_edit() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        assert!(!session.has_active_edit());
        assert!(matches!(session.select_track("a"), Err(FluidError::NoActiveEdit)));
        assert!(matches!(
            session.save_active_edit(None, PathMode::Relative),
            Err(FluidError::NoActiveEdit)
        ));
    }

    #[test]
    fn test_default_track_created_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        session.create_edit(temp_dir.path().join("song.json"));

        let first = session.default_track().unwrap().id;
        let second = session.default_track().unwrap().id;
        assert_eq!(first, second);
        assert_eq!(session.edit().unwrap().tracks()[0].name, "Fluid Track");
        assert_eq!(session.selection().track, Some(first));
    }

    #[test]
    fn test_default_track_follows_selection() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        let edit = session.create_edit(temp_dir.path().join("song.json"));
        let first = edit.insert_track("a", InsertPoint::End).id;
        edit.insert_track("b", InsertPoint::End);

        assert_eq!(session.default_track().unwrap().id, first);
        let b = session.select_track("b").unwrap().id;
        assert_eq!(session.default_track().unwrap().id, b);
    }

    #[test]
    fn test_selecting_track_clears_clip_selection() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        session.create_edit(temp_dir.path().join("song.json"));

        session.select_midi_clip("verse").unwrap();
        assert!(session.selection().clip.is_some());
        session.select_track("other").unwrap();
        assert!(session.selection().clip.is_none());
    }

    #[test]
    fn test_select_plugin_uses_host() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig {
            known_plugins: crate::host::PluginCatalog::new(vec![PluginDescription::new("Zebra2", "VST")]),
            working_dir: Some(temp_dir.path().to_path_buf()),
            ..EngineConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        session.create_edit(temp_dir.path().join("song.json"));

        let id = session.select_plugin("zebra2", "").unwrap().id;
        assert_eq!(session.selection().plugin, Some(id));
        assert!(session.select_plugin("Zebra2", "VST3").unwrap_err().is_not_found());
    }

    #[test]
    fn test_save_relative_keeps_memory_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        let edit_path = temp_dir.path().join("edits").join("song.json");
        let kick = temp_dir.path().join("audio").join("kick.wav");

        session
            .create_edit(&edit_path)
            .insert_track("drums", InsertPoint::End)
            .insert_audio_reference(
                "kick",
                SourceReference::new(kick.to_string_lossy()),
                TimeRange::new(0.0, 1.0),
            );

        let report = session.save_active_edit(None, PathMode::Relative).unwrap();
        assert_eq!(report.updated, 1);

        let stored = std::fs::read_to_string(&edit_path).unwrap();
        assert!(stored.contains("\"../audio/kick.wav\""));

        let in_memory = &session.edit().unwrap().tracks()[0].clips()[0];
        assert_eq!(in_memory.audio().unwrap().source.source, kick.to_string_lossy());
    }

    #[test]
    fn test_open_edit_makes_sources_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let edit_path = temp_dir.path().join("song.json");

        let mut edit = Edit::with_file(&edit_path);
        edit.insert_track("drums", InsertPoint::End).insert_audio_reference(
            "kick",
            SourceReference::new("audio/kick.wav"),
            TimeRange::new(0.0, 1.0),
        );
        edit.write_to(&edit_path).unwrap();

        let mut session = session_in(temp_dir.path());
        let report = session.open_edit(&edit_path).unwrap();
        assert_eq!(report.updated, 1);

        let clip = &session.edit().unwrap().tracks()[0].clips()[0];
        assert_eq!(
            PathBuf::from(&clip.audio().unwrap().source.source),
            temp_dir.path().join("audio").join("kick.wav")
        );
    }

    #[test]
    fn test_failed_save_keeps_edit_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        let edit_path = temp_dir.path().join("song.json");
        let kick = temp_dir.path().join("audio").join("kick.wav");
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        session
            .create_edit(&edit_path)
            .insert_track("drums", InsertPoint::End)
            .insert_audio_reference(
                "kick",
                SourceReference::new(kick.to_string_lossy()),
                TimeRange::new(0.0, 1.0),
            );

        let err = session
            .save_active_edit(Some(&blocker.join("out.json")), PathMode::Relative)
            .unwrap_err();
        assert_eq!(err.error_code(), "FILE_WRITE_ERROR");

        let edit = session.edit().unwrap();
        assert_eq!(edit.edit_file(), Some(edit_path.as_path()));
        let clip = &edit.tracks()[0].clips()[0];
        assert_eq!(clip.audio().unwrap().source.source, kick.to_string_lossy());
    }

    #[test]
    fn test_save_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_in(temp_dir.path());
        session.set_active_edit(Edit::new());
        let err = session.save_active_edit(None, PathMode::Absolute).unwrap_err();
        assert_eq!(err.error_code(), "NO_EDIT_FILE");
    }
}
