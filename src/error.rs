//! Error handling for Fluid
//!
//! Resolver misses and unresolvable sources are ordinary outcomes, so most
//! variants here are reported and skipped rather than propagated to the user.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Fluid operations
pub type Result<T> = std::result::Result<T, FluidError>;

/// Main error type for Fluid operations
#[derive(Error, Debug)]
pub enum FluidError {
    // Resolver Errors
    #[error("Plugin not found: {name} ({plugin_type})")]
    PluginNotFound { name: String, plugin_type: String },

    #[error("Track '{track}' cannot insert plugin: {name}")]
    PluginChainFull { track: String, name: String },

    // Source Errors
    #[error("Failed to resolve source of clip '{clip}': source=\"{descriptor}\"")]
    UnresolvableReference { clip: String, descriptor: String },

    #[error("Invalid audio file: {path}: {reason}")]
    InvalidAudio { path: PathBuf, reason: String },

    // Session Errors
    #[error("No active edit")]
    NoActiveEdit,

    #[error("Edit has no file to save to")]
    NoEditFile,

    #[error("Edit not found: {path}")]
    EditNotFound { path: PathBuf },

    #[error("Invalid argument for {command}: {reason}")]
    InvalidArgument { command: String, reason: String },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FluidError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FluidError::PluginNotFound { .. } => "PLUGIN_NOT_FOUND",
            FluidError::PluginChainFull { .. } => "PLUGIN_CHAIN_FULL",
            FluidError::UnresolvableReference { .. } => "UNRESOLVABLE_REFERENCE",
            FluidError::InvalidAudio { .. } => "INVALID_AUDIO",
            FluidError::NoActiveEdit => "NO_ACTIVE_EDIT",
            FluidError::NoEditFile => "NO_EDIT_FILE",
            FluidError::EditNotFound { .. } => "EDIT_NOT_FOUND",
            FluidError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            FluidError::FileReadError { .. } => "FILE_READ_ERROR",
            FluidError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            FluidError::Io(_) => "IO_ERROR",
            FluidError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for the plugin resolver's "nothing matched, nothing created" outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FluidError::PluginNotFound { .. } | FluidError::PluginChainFull { .. }
        )
    }

    /// Check if the command that produced this error can simply be skipped
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FluidError::PluginNotFound { .. }
                | FluidError::PluginChainFull { .. }
                | FluidError::UnresolvableReference { .. }
                | FluidError::NoActiveEdit
                | FluidError::InvalidArgument { .. }
        )
    }
}
