//! Plugins and the per-track plugin chain
//!
//! A plugin is either engine-native (identified by its type string, e.g.
//! `"volume"` or `"reverb"`) or hosted from an external format (identified by
//! display name plus format, e.g. `"Zebra2"` / `"VST3"`). The two identity
//! spaces are kept apart in [`PluginIdentity`] so matching never has to guess
//! which one a plugin lives in.
//!
//! Chains are processed in order (index 0 first). The volume/pan plugin acts
//! as the track fader and stays after anything inserted by name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::InsertPoint;

/// Format token that selects engine-native plugins.
pub const INTERNAL_PLUGIN_FORMAT: &str = "tracktion";

/// Type string of the volume & pan plugin.
pub const VOLUME_PLUGIN_TYPE: &str = "volume";

/// Default maximum number of plugins per track.
pub const DEFAULT_MAX_PLUGINS: usize = 16;

/// How a plugin is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PluginIdentity {
    /// Engine-native plugin
    Internal { type_name: String },
    /// Plugin hosted from an external format
    External { name: String, format: String },
}

impl PluginIdentity {
    /// Does this identity answer to `name`, optionally restricted to `plugin_type`?
    ///
    /// An empty `plugin_type` matches any format. Comparisons ignore case.
    pub fn matches(&self, name: &str, plugin_type: &str) -> bool {
        match self {
            PluginIdentity::External {
                name: display_name,
                format,
            } => {
                display_name.eq_ignore_ascii_case(name)
                    && (plugin_type.is_empty() || format.eq_ignore_ascii_case(plugin_type))
            }
            PluginIdentity::Internal { type_name } => {
                type_name.eq_ignore_ascii_case(name)
                    && (plugin_type.is_empty()
                        || plugin_type.eq_ignore_ascii_case(INTERNAL_PLUGIN_FORMAT))
            }
        }
    }

    /// Name shown to users: the display name or the internal type string.
    pub fn name(&self) -> &str {
        match self {
            PluginIdentity::Internal { type_name } => type_name,
            PluginIdentity::External { name, .. } => name,
        }
    }

    /// Format name, with [`INTERNAL_PLUGIN_FORMAT`] for engine-native plugins.
    pub fn format(&self) -> &str {
        match self {
            PluginIdentity::Internal { .. } => INTERNAL_PLUGIN_FORMAT,
            PluginIdentity::External { format, .. } => format,
        }
    }
}

/// A plugin instance on a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plugin {
    /// Unique identifier for this plugin instance.
    pub id: Uuid,

    /// Internal type or external name/format.
    pub identity: PluginIdentity,

    /// Whether the plugin is currently enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Plugin {
    pub fn internal(type_name: &str) -> Self {
        Self::with_identity(PluginIdentity::Internal {
            type_name: type_name.to_string(),
        })
    }

    pub fn external(name: &str, format: &str) -> Self {
        Self::with_identity(PluginIdentity::External {
            name: name.to_string(),
            format: format.to_string(),
        })
    }

    fn with_identity(identity: PluginIdentity) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn is_external(&self) -> bool {
        matches!(self.identity, PluginIdentity::External { .. })
    }

    /// True for the track's volume & pan plugin.
    pub fn is_volume_pan(&self) -> bool {
        matches!(
            &self.identity,
            PluginIdentity::Internal { type_name } if type_name.eq_ignore_ascii_case(VOLUME_PLUGIN_TYPE)
        )
    }
}

/// Where a new plugin goes in `chain`: just before the first volume & pan
/// plugin, or at the end if there is none.
pub fn insertion_point(chain: &[Plugin]) -> InsertPoint {
    chain
        .iter()
        .position(Plugin::is_volume_pan)
        .map_or(InsertPoint::End, InsertPoint::At)
}

/// Ordered plugins on a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginChain {
    #[serde(default)]
    plugins: Vec<Plugin>,

    /// Set from the owning edit on load.
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_MAX_PLUGINS
}

impl PluginChain {
    /// Create an empty chain with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PLUGINS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            plugins: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Whether another plugin fits in this chain.
    pub fn can_insert_plugin(&self) -> bool {
        self.plugins.len() < self.capacity
    }

    /// Insert a plugin. Returns `None` when the chain is full.
    pub fn insert_plugin(&mut self, plugin: Plugin, at: InsertPoint) -> Option<&mut Plugin> {
        if !self.can_insert_plugin() {
            return None;
        }
        let index = at.index_in(self.plugins.len());
        self.plugins.insert(index, plugin);
        Some(&mut self.plugins[index])
    }

    /// Remove a plugin by ID
    pub fn remove(&mut self, plugin_id: Uuid) -> Option<Plugin> {
        let index = self.position(plugin_id)?;
        Some(self.plugins.remove(index))
    }

    /// Index of a plugin in the chain
    pub fn position(&self, plugin_id: Uuid) -> Option<usize> {
        self.plugins.iter().position(|p| p.id == plugin_id)
    }

    /// Get a plugin by ID
    pub fn get(&self, plugin_id: Uuid) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id == plugin_id)
    }

    pub fn as_slice(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn as_mut_slice(&mut self) -> &mut [Plugin] {
        &mut self.plugins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Zebra2", "", true ; "name only")]
    #[test_case("zebra2", "vst", true ; "case insensitive")]
    #[test_case("Zebra2", "VST3", false ; "format mismatch")]
    #[test_case("Diva", "", false ; "name mismatch")]
    #[test_case("Zebra2", "tracktion", false ; "internal marker")]
    fn test_external_matching(name: &str, plugin_type: &str, expected: bool) {
        let identity = PluginIdentity::External {
            name: "Zebra2".to_string(),
            format: "VST".to_string(),
        };
        assert_eq!(identity.matches(name, plugin_type), expected);
    }

    #[test_case("reverb", "", true ; "type only")]
    #[test_case("REVERB", "Tracktion", true ; "case insensitive marker")]
    #[test_case("reverb", "VST", false ; "external format")]
    #[test_case("Reverb Plugin", "", false ; "display name")]
    fn test_internal_matching(name: &str, plugin_type: &str, expected: bool) {
        let identity = PluginIdentity::Internal {
            type_name: "reverb".to_string(),
        };
        assert_eq!(identity.matches(name, plugin_type), expected);
    }

    #[test]
    fn test_insertion_point_before_volume() {
        let chain = vec![
            Plugin::internal("reverb"),
            Plugin::internal("volume"),
            Plugin::internal("level"),
        ];
        assert_eq!(insertion_point(&chain), InsertPoint::At(1));
    }

    #[test]
    fn test_insertion_point_without_volume() {
        let chain = vec![Plugin::internal("reverb"), Plugin::external("Zebra2", "VST")];
        assert_eq!(insertion_point(&chain), InsertPoint::End);
        assert_eq!(insertion_point(&[]), InsertPoint::End);
    }

    #[test]
    fn test_external_named_volume_is_not_fader() {
        assert!(!Plugin::external("volume", "VST3").is_volume_pan());
        assert!(Plugin::internal("Volume").is_volume_pan());
    }

    #[test]
    fn test_chain_capacity() {
        let mut chain = PluginChain::with_capacity(1);
        assert!(chain.insert_plugin(Plugin::internal("delay"), InsertPoint::End).is_some());
        assert!(!chain.can_insert_plugin());
        assert!(chain.insert_plugin(Plugin::internal("reverb"), InsertPoint::End).is_none());
        assert_eq!(chain.len(), 1);
    }
}
