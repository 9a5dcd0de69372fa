//! CLI Module
//!
//! Command-line interface for scripting edit files.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::edit::PathMode;

/// Fluid - build and package DAW edits from scripts
#[derive(Parser, Debug)]
#[command(name = "fluid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Source path form on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathModeArg {
    Relative,
    Absolute,
}

impl From<PathModeArg> for PathMode {
    fn from(mode: PathModeArg) -> Self {
        match mode {
            PathModeArg::Relative => PathMode::Relative,
            PathModeArg::Absolute => PathMode::Absolute,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty edit file
    #[command(name = "create")]
    Create {
        /// Path for the new edit
        path: PathBuf,
    },

    /// Run one command against an edit and save it
    #[command(name = "exec")]
    Exec {
        /// Path to the edit
        path: PathBuf,

        /// Command address, e.g. /insert
        address: String,

        /// Command arguments; numbers become numeric arguments
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,

        /// Source path form used when saving
        #[arg(long, value_enum, default_value_t = PathModeArg::Relative)]
        mode: PathModeArg,
    },

    /// Add a MIDI clip (with one note) to the edit's target track
    #[command(name = "insert")]
    Insert {
        /// Path to the edit
        path: PathBuf,

        /// Clip name
        name: Option<String>,
    },

    /// Add a plugin to a track unless it is already there
    #[command(name = "plugin")]
    Plugin {
        /// Path to the edit
        path: PathBuf,

        /// Plugin name (external) or type (internal)
        name: String,

        /// Plugin format, e.g. VST3, or "tracktion" for internal plugins
        #[arg(short = 't', long = "type", default_value = "")]
        plugin_type: String,

        /// Track to add the plugin to
        #[arg(long)]
        track: Option<String>,
    },

    /// Rewrite audio clip sources as absolute or relative paths
    #[command(name = "normalize")]
    Normalize {
        /// Path to the edit
        path: PathBuf,

        /// Target path form
        #[arg(short, long, value_enum, default_value_t = PathModeArg::Relative)]
        mode: PathModeArg,

        /// Fail if any source could not be resolved
        #[arg(long)]
        strict: bool,
    },

    /// Print the edit's tracks, clips and plugins
    #[command(name = "print")]
    Print {
        /// Path to the edit
        path: PathBuf,
    },
}
