//! Fluid - Scriptable DAW Edit Engine
//!
//! Builds and modifies edit documents from scripted commands:
//! 1. Resolvers - get-or-create tracks, MIDI clips and plugins by name
//! 2. Normalizer - rewrite audio clip sources as absolute or edit-relative paths
//!
//! # Architecture
//!
//! - [`edit`]: the document model (edit → tracks → clips / plugin chain)
//! - [`host`]: plugin catalog and engine-native plugin types
//! - [`resolve`]: idempotent find-or-create over the document
//! - [`normalize`]: batch source rewriting that tolerates per-clip failure
//! - [`session`]: the single active edit plus its collaborators
//! - [`dispatch`]: maps address-style commands onto the session

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod edit;
pub mod error;
pub mod host;
pub mod normalize;
pub mod resolve;
pub mod session;

pub use error::{FluidError, Result};
