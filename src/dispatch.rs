//! Command Dispatch
//!
//! Maps address-style commands (`/insert`, `/save`, ...) onto session
//! operations. Transport and framing live elsewhere; a [`Command`] arrives
//! here already decoded into typed arguments.
//!
//! Every command except `/test` needs an active edit and is ignored without
//! one. Resolver misses are logged and turn the command into a no-op.

use std::fmt;

use log::{debug, info, warn};

use crate::edit::{MidiNote, PathMode};
use crate::error::{FluidError, Result};
use crate::session::Session;

pub const TEST: &str = "/test";
pub const INSERT: &str = "/insert";
pub const SAVE: &str = "/save";
pub const NORMALIZE: &str = "/normalize";
pub const SELECT_TRACK: &str = "/audiotrack/select";
pub const SELECT_MIDI_CLIP: &str = "/midiclip/select";
pub const SELECT_PLUGIN: &str = "/plugin/select";
pub const INSERT_AUDIO_CLIP: &str = "/audioclip/insert";

/// Note added by `/insert`: pitch 36, channel 1, beat 1, velocity 127, length 0.
pub const INSERT_NOTE: MidiNote = MidiNote {
    pitch: 36,
    channel: 1,
    start_beat: 1.0,
    velocity: 127,
    length_beats: 0.0,
};

/// RGBA color argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// A typed command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i32),
    Float(f32),
    Str(String),
    Blob(Vec<u8>),
    Color(Rgba),
}

impl Arg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of an int or float argument.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Int(v) => Some(*v as f64),
            Arg::Float(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Parse a bare text token: integers, then floats, then strings.
    pub fn parse_token(token: &str) -> Self {
        if let Ok(v) = token.parse::<i32>() {
            Arg::Int(v)
        } else if let Ok(v) = token.parse::<f32>() {
            Arg::Float(v)
        } else {
            Arg::Str(token.to_string())
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => write!(f, "{}", v),
            Arg::Float(v) => write!(f, "{}", v),
            Arg::Str(s) => f.write_str(s),
            Arg::Blob(bytes) => f.write_str(&hex::encode(bytes)),
            Arg::Color(c) => write!(f, "RGBA({},{},{},{})", c.red, c.green, c.blue, c.alpha),
        }
    }
}

/// An address plus its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub address: String,
    pub args: Vec<Arg>,
}

impl Command {
    pub fn new(address: &str, args: Vec<Arg>) -> Self {
        Self {
            address: address.to_string(),
            args,
        }
    }

    /// Argument `index` if it is a string.
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Arg::as_str)
    }

    fn required_str(&self, index: usize, what: &str) -> Result<&str> {
        self.str_arg(index).ok_or_else(|| FluidError::InvalidArgument {
            command: self.address.clone(),
            reason: format!("argument {} ({}) must be a string", index, what),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)?;
        for arg in &self.args {
            write!(f, " - {}", arg)?;
        }
        Ok(())
    }
}

/// Why a command had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    NoActiveEdit,
    UnknownCommand,
    NotFound(String),
}

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

/// Run one command against `session`.
///
/// Resolver misses come back as `Ok(Outcome::Ignored(..))`. Errors are
/// reserved for bad arguments and I/O failures while saving.
pub fn dispatch(session: &mut Session, command: &Command) -> Result<Outcome> {
    if command.address == TEST {
        info!("{}", command);
        return Ok(Outcome::Applied);
    }

    if !session.has_active_edit() {
        debug!("Ignoring {}: no active edit", command.address);
        return Ok(Outcome::Ignored(IgnoreReason::NoActiveEdit));
    }

    let result = match command.address.as_str() {
        INSERT => insert(session, command),
        SAVE => save(session, command),
        NORMALIZE => normalize(session, command),
        SELECT_TRACK => {
            let name = command.required_str(0, "track name")?;
            session.select_track(name).map(|_| ())
        }
        SELECT_MIDI_CLIP => {
            let name = command.required_str(0, "clip name")?;
            session.select_midi_clip(name).map(|_| ())
        }
        SELECT_PLUGIN => {
            let name = command.required_str(0, "plugin name")?;
            let plugin_type = command.str_arg(1).unwrap_or("");
            session.select_plugin(name, plugin_type).map(|_| ())
        }
        INSERT_AUDIO_CLIP => insert_audio_clip(session, command),
        _ => {
            debug!("Ignoring unknown command: {}", command.address);
            return Ok(Outcome::Ignored(IgnoreReason::UnknownCommand));
        }
    };

    match result {
        Ok(()) => Ok(Outcome::Applied),
        Err(e) if e.is_not_found() => Ok(Outcome::Ignored(IgnoreReason::NotFound(e.to_string()))),
        Err(e) => Err(e),
    }
}

fn insert(session: &mut Session, command: &Command) -> Result<()> {
    let name = command
        .str_arg(0)
        .map(str::to_string)
        .unwrap_or_else(|| session.config().default_clip_name.clone());

    let clip = session.select_midi_clip(&name)?;
    if let Some(sequence) = clip.sequence_mut() {
        sequence.add_note(INSERT_NOTE);
    }
    Ok(())
}

fn save(session: &mut Session, command: &Command) -> Result<()> {
    let file = command.str_arg(0).map(|f| session.resolve_file(f));
    let mode = command.str_arg(1).map_or(PathMode::Relative, PathMode::from_token);

    let report = session.save_active_edit(file.as_deref(), mode)?;
    for line in report.render(false) {
        warn!("{}", line);
    }
    Ok(())
}

fn normalize(session: &mut Session, command: &Command) -> Result<()> {
    let mode = command.str_arg(0).map_or(PathMode::Relative, PathMode::from_token);

    let report = session.normalize_sources(mode)?;
    info!(
        "Normalized sources to {} paths: {} updated, {} unchanged, {} failed",
        mode, report.updated, report.unchanged, report.failed
    );
    Ok(())
}

fn insert_audio_clip(session: &mut Session, command: &Command) -> Result<()> {
    let name = command.required_str(0, "clip name")?;
    let start = command
        .args
        .get(1)
        .and_then(Arg::as_f64)
        .ok_or_else(|| FluidError::InvalidArgument {
            command: command.address.clone(),
            reason: "argument 1 (start) must be a number".to_string(),
        })?;
    let file = command.required_str(2, "file")?;

    session.insert_audio_clip(name, file, start).map(|_| ())
}
