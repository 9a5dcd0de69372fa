//! Resolvers
//!
//! Get-or-create lookups over the edit. Each resolver first scans in
//! document order and returns the first match; only on a miss does it create
//! the entity, so calling a resolver twice with the same arguments returns the
//! same entity and leaves the edit unchanged the second time.

pub mod clip;
pub mod plugin;
pub mod track;

pub use clip::{resolve_midi_clip, DEFAULT_CLIP_LENGTH};
pub use plugin::resolve_plugin;
pub use track::resolve_track;
