//! Plugin Host
//!
//! What the engine knows how to instantiate: hosted plugins from the scanned
//! catalog, and engine-native plugins by type string. Both are populated
//! outside this crate and only read here.

use serde::{Deserialize, Serialize};

use crate::edit::{Plugin, PluginIdentity};

/// A scanned, installable external plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescription {
    /// Display name, e.g. "Zebra2"
    pub name: String,
    /// Hosting format, e.g. "VST", "VST3", "AudioUnit"
    pub format: String,
}

impl PluginDescription {
    pub fn new(name: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            format: format.to_string(),
        }
    }
}

/// Known external plugins, in scan order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginCatalog {
    descriptions: Vec<PluginDescription>,
}

impl PluginCatalog {
    pub fn new(descriptions: Vec<PluginDescription>) -> Self {
        Self { descriptions }
    }

    /// First description named `name` (case-insensitive). A non-empty
    /// `format` must also match (case-insensitive).
    pub fn find(&self, name: &str, format: &str) -> Option<&PluginDescription> {
        self.descriptions.iter().find(|desc| {
            desc.name.eq_ignore_ascii_case(name)
                && (format.is_empty() || desc.format.eq_ignore_ascii_case(format))
        })
    }

    /// Whether an external plugin with this name and format is installed.
    pub fn contains(&self, name: &str, format: &str) -> bool {
        self.descriptions
            .iter()
            .any(|desc| desc.name.eq_ignore_ascii_case(name) && desc.format.eq_ignore_ascii_case(format))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginDescription> {
        self.descriptions.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

/// Engine-native plugin types that can be created from their type string.
pub const BUILTIN_PLUGIN_TYPES: &[&str] = &[
    // Track utilities
    "volume",
    "level",
    "vca",
    "text",
    "freezePoint",
    "auxsend",
    "auxreturn",
    // Effects and instruments
    "chorus",
    "compressor",
    "delay",
    "4bandEq",
    "4osc",
    "lowpass",
    "midiModifier",
    "midiPatchBay",
    "patchbay",
    "phaser",
    "pitchShift",
    "reverb",
    "sampler",
];

/// Creates engine-native plugins by type string.
#[derive(Debug, Clone)]
pub struct InternalPluginRegistry {
    types: Vec<String>,
}

impl InternalPluginRegistry {
    /// Registry with no types at all
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Make another type creatable. Re-registering is a no-op.
    pub fn register(&mut self, type_name: &str) {
        if self.canonical_type(type_name).is_none() {
            self.types.push(type_name.to_string());
        }
    }

    /// Registered spelling of `type_name` (case-insensitive lookup).
    pub fn canonical_type(&self, type_name: &str) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.eq_ignore_ascii_case(type_name))
            .map(String::as_str)
    }

    /// Instantiate `type_name`. `None` if the engine has no such plugin.
    pub fn create(&self, type_name: &str) -> Option<Plugin> {
        self.canonical_type(type_name).map(Plugin::internal)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }
}

impl Default for InternalPluginRegistry {
    fn default() -> Self {
        Self {
            types: BUILTIN_PLUGIN_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Everything plugin creation needs from the engine.
#[derive(Debug, Clone, Default)]
pub struct PluginHost {
    pub catalog: PluginCatalog,
    pub internal: InternalPluginRegistry,
}

impl PluginHost {
    pub fn new(catalog: PluginCatalog, internal: InternalPluginRegistry) -> Self {
        Self { catalog, internal }
    }

    /// Whether a plugin stored in an edit can be loaded by this host.
    pub fn is_available(&self, plugin: &Plugin) -> bool {
        match &plugin.identity {
            PluginIdentity::Internal { type_name } => self.internal.canonical_type(type_name).is_some(),
            PluginIdentity::External { name, format } => self.catalog.contains(name, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PluginCatalog {
        PluginCatalog::new(vec![
            PluginDescription::new("Zebra2", "VST"),
            PluginDescription::new("Zebra2", "VST3"),
            PluginDescription::new("Podolski", "AudioUnit"),
        ])
    }

    #[test]
    fn test_catalog_find_first_match() {
        let catalog = catalog();
        assert_eq!(catalog.find("zebra2", "").unwrap().format, "VST");
        assert_eq!(catalog.find("Zebra2", "vst3").unwrap().format, "VST3");
        assert!(catalog.find("Zebra2", "AudioUnit").is_none());
        assert!(catalog.find("Diva", "").is_none());
    }

    #[test]
    fn test_registry_canonical_spelling() {
        let registry = InternalPluginRegistry::default();
        let plugin = registry.create("4BANDEQ").unwrap();
        assert_eq!(plugin.name(), "4bandEq");
        assert!(registry.create("zebra2").is_none());
    }

    #[test]
    fn test_registry_register() {
        let mut registry = InternalPluginRegistry::empty();
        assert!(registry.create("openframeworks").is_none());
        registry.register("openframeworks");
        registry.register("OpenFrameworks");
        assert_eq!(registry.types().count(), 1);
        assert!(registry.create("openframeworks").is_some());
    }

    #[test]
    fn test_host_availability() {
        let host = PluginHost::new(catalog(), InternalPluginRegistry::default());
        assert!(host.is_available(&Plugin::internal("reverb")));
        assert!(host.is_available(&Plugin::external("Podolski", "AudioUnit")));
        assert!(!host.is_available(&Plugin::external("Diva", "VST3")));
    }

    #[test]
    fn test_availability_ignores_name_case() {
        let host = PluginHost::new(catalog(), InternalPluginRegistry::default());
        assert!(host.is_available(&Plugin::external("ZEBRA2", "vst3")));
        assert!(host.catalog.contains("podolski", "AudioUnit"));
        assert!(!host.catalog.contains("podolski", "VST"));
    }
}
