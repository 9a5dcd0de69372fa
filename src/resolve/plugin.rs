//! Plugin resolver
//!
//! `name` and `plugin_type` select across two identity spaces:
//!
//! | plugin   | `name` compared with | `plugin_type` must be           |
//! |----------|----------------------|---------------------------------|
//! | external | display name         | empty or the plugin's format    |
//! | internal | type string          | empty or `"tracktion"`          |
//!
//! All comparisons ignore case. On a miss the plugin is created from the
//! catalog, or failing that as an engine-native type, and inserted just before
//! the track's volume & pan plugin.

use log::{debug, info, warn};

use crate::edit::{insertion_point, Plugin, Track, INTERNAL_PLUGIN_FORMAT};
use crate::error::{FluidError, Result};
use crate::host::PluginHost;

/// Return the first plugin on `track` matching `name`/`plugin_type`, creating
/// and inserting one if possible.
///
/// Errors with [`FluidError::PluginChainFull`] or [`FluidError::PluginNotFound`]
/// when nothing matches and nothing can be created. The track is only modified
/// when a plugin is created.
pub fn resolve_plugin<'t>(
    track: &'t mut Track,
    host: &PluginHost,
    name: &str,
    plugin_type: &str,
) -> Result<&'t mut Plugin> {
    let found = track
        .plugins()
        .as_slice()
        .iter()
        .position(|p| p.identity.matches(name, plugin_type));
    if let Some(index) = found {
        debug!("Plugin select found existing plugin: {}", name);
        return Ok(&mut track.plugins_mut().as_mut_slice()[index]);
    }

    if !track.plugins().can_insert_plugin() {
        warn!("Selected track cannot insert plugin: {}", name);
        return Err(FluidError::PluginChainFull {
            track: track.name.clone(),
            name: name.to_string(),
        });
    }

    let at = insertion_point(track.plugins().as_slice());
    debug!("Plugin insert point: {:?}", at);

    let plugin = match create_plugin(host, name, plugin_type) {
        Some(plugin) => plugin,
        None => {
            let type_name = if plugin_type.is_empty() { "any type" } else { plugin_type };
            warn!("Plugin not found: {} ({})", name, type_name);
            return Err(FluidError::PluginNotFound {
                name: name.to_string(),
                plugin_type: type_name.to_string(),
            });
        }
    };

    info!(
        "Inserting \"{}\" ({}) into track: {}",
        plugin.name(),
        plugin.identity.format(),
        track.name
    );
    let track_name = track.name.clone();
    track
        .plugins_mut()
        .insert_plugin(plugin, at)
        .ok_or(FluidError::PluginChainFull {
            track: track_name,
            name: name.to_string(),
        })
}

/// Catalog entries take precedence over engine-native types of the same name.
fn create_plugin(host: &PluginHost, name: &str, plugin_type: &str) -> Option<Plugin> {
    if let Some(desc) = host.catalog.find(name, plugin_type) {
        return Some(Plugin::external(&desc.name, &desc.format));
    }

    if plugin_type.is_empty() || plugin_type.eq_ignore_ascii_case(INTERNAL_PLUGIN_FORMAT) {
        return host.internal.create(name);
    }

    None
}
