//! Engine configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "known_plugins": [{ "name": "Zebra2", "format": "VST" }],
//!   "extra_internal_plugins": ["openframeworks"],
//!   "max_plugins_per_track": 16,
//!   "project_items": { "4215/107": "/Users/me/Waveform/kick.wav" },
//!   "default_track_name": "Fluid Track",
//!   "default_clip_name": "Fluid Clip"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::edit::{absolute_path, ProjectLibrary, DEFAULT_MAX_PLUGINS};
use crate::error::{FluidError, Result};
use crate::host::{InternalPluginRegistry, PluginCatalog, PluginHost};

/// Track created when a command needs a target and the edit has none.
pub const DEFAULT_TRACK_NAME: &str = "Fluid Track";

/// Clip name used by `/insert` without arguments.
pub const DEFAULT_CLIP_NAME: &str = "Fluid Clip";

/// Settings for a [`Session`](crate::session::Session).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scanned external plugins.
    pub known_plugins: PluginCatalog,

    /// Engine-native plugin types beyond the built-in set.
    pub extra_internal_plugins: Vec<String>,

    /// Plugin chain capacity for every track.
    pub max_plugins_per_track: usize,

    /// Project item ids and their files.
    pub project_items: ProjectLibrary,

    /// Name of the track created on demand.
    pub default_track_name: String,

    /// Name of the clip `/insert` targets without arguments.
    pub default_clip_name: String,

    /// Base directory for relative file arguments; the process working
    /// directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            known_plugins: PluginCatalog::default(),
            extra_internal_plugins: Vec::new(),
            max_plugins_per_track: DEFAULT_MAX_PLUGINS,
            project_items: ProjectLibrary::default(),
            default_track_name: DEFAULT_TRACK_NAME.to_string(),
            default_clip_name: DEFAULT_CLIP_NAME.to_string(),
            working_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FluidError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Build the plugin host described by this configuration.
    pub fn plugin_host(&self) -> PluginHost {
        let mut internal = InternalPluginRegistry::default();
        for type_name in &self.extra_internal_plugins {
            internal.register(type_name);
        }
        PluginHost::new(self.known_plugins.clone(), internal)
    }

    /// Directory relative file arguments are joined onto.
    pub fn resolve_working_dir(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) => Ok(absolute_path(dir)),
            None => Ok(std::env::current_dir()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Plugin, SourceReference, SourceResolver};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_plugins_per_track, DEFAULT_MAX_PLUGINS);
        assert_eq!(config.default_track_name, "Fluid Track");
        assert_eq!(config.default_clip_name, "Fluid Clip");
        assert!(config.known_plugins.is_empty());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fluid.json");
        fs::write(
            &path,
            r#"{
                "known_plugins": [{ "name": "Zebra2", "format": "VST" }],
                "extra_internal_plugins": ["openframeworks"],
                "max_plugins_per_track": 4,
                "project_items": { "1/2": "/lib/kick.wav" }
            }"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_plugins_per_track, 4);
        assert_eq!(
            config.project_items.resolve(&SourceReference::new("1/2"), None),
            Some(PathBuf::from("/lib/kick.wav"))
        );

        let host = config.plugin_host();
        assert!(host.catalog.find("zebra2", "vst").is_some());
        assert!(host.is_available(&Plugin::internal("openframeworks")));
    }

    #[test]
    fn test_relative_working_dir_is_absolute() {
        let config = EngineConfig {
            working_dir: Some(PathBuf::from("media")),
            ..EngineConfig::default()
        };
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.resolve_working_dir().unwrap(), cwd.join("media"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }
}
