//! CLI Command Implementations
//!
//! Each command opens the edit in a fresh session, runs through the same
//! dispatcher a remote client would use, and writes the edit back.

use std::path::Path;

use log::{info, warn};

use crate::config::EngineConfig;
use crate::dispatch::{self, Arg, Command, Outcome};
use crate::edit::{ClipContent, Edit, PathMode};
use crate::error::{FluidError, Result};
use crate::normalize::NormalizeReport;
use crate::session::Session;

/// Create a new, empty edit file.
pub fn create_edit(config: &EngineConfig, path: &Path) -> Result<()> {
    info!("Creating new edit at: {}", path.display());

    let mut session = Session::new(config.clone())?;
    session.create_edit(path);
    session.save_active_edit(None, PathMode::Relative)?;

    println!("Edit created: {}", path.display());
    Ok(())
}

/// Run one command against the edit at `path`, then save it in `mode`.
pub fn exec(
    config: &EngineConfig,
    path: &Path,
    address: &str,
    args: &[String],
    mode: PathMode,
) -> Result<Outcome> {
    let command = Command::new(address, args.iter().map(|a| Arg::parse_token(a)).collect());
    run(config, path, &command, mode)
}

/// Add a MIDI clip with one note to the target track.
pub fn insert(config: &EngineConfig, path: &Path, name: Option<&str>) -> Result<()> {
    let args = name.map(|n| vec![Arg::Str(n.to_string())]).unwrap_or_default();
    run(config, path, &Command::new(dispatch::INSERT, args), PathMode::Relative)?;
    Ok(())
}

/// Add a plugin to `track` (or the target track) unless it is already there.
pub fn add_plugin(
    config: &EngineConfig,
    path: &Path,
    name: &str,
    plugin_type: &str,
    track: Option<&str>,
) -> Result<()> {
    let mut session = open(config, path)?;

    if let Some(track) = track {
        session.select_track(track)?;
    }
    let command = Command::new(
        dispatch::SELECT_PLUGIN,
        vec![Arg::Str(name.to_string()), Arg::Str(plugin_type.to_string())],
    );

    match dispatch::dispatch(&mut session, &command)? {
        Outcome::Applied => {
            session.save_active_edit(None, PathMode::Relative)?;
            println!("Plugin ready: {}", name);
        }
        Outcome::Ignored(reason) => println!("No change: {:?}", reason),
    }
    Ok(())
}

/// Rewrite every audio clip source in the edit at `path` to `mode`.
pub fn normalize(config: &EngineConfig, path: &Path, mode: PathMode, verbose: bool) -> Result<NormalizeReport> {
    info!("Normalizing sources in: {}", path.display());

    let mut session = Session::new(config.clone())?;
    session.set_active_edit(Edit::load(path)?);

    let report = session.normalize_sources(mode)?;
    session
        .edit_mut()
        .ok_or(FluidError::NoActiveEdit)?
        .write_to(path)?;

    for line in report.render(verbose) {
        println!("{}", line);
    }
    println!(
        "{} updated, {} unchanged, {} failed",
        report.updated, report.unchanged, report.failed
    );
    Ok(report)
}

/// Print the edit's tracks, clips and plugins.
pub fn print_edit(path: &Path) -> Result<()> {
    let edit = Edit::load(path)?;

    println!("Edit {} ({})", edit.id, path.display());
    println!("Modified: {}", edit.modified_at.format("%Y-%m-%d %H:%M:%S"));
    println!("{:-<60}", "");

    for track in edit.tracks() {
        println!("Track \"{}\"", track.name);
        for clip in track.clips() {
            match &clip.content {
                ClipContent::Midi(sequence) => println!(
                    "    [midi]  \"{}\" {:.3}-{:.3}s, {} note(s)",
                    clip.name,
                    clip.range.start,
                    clip.range.end,
                    sequence.notes().len()
                ),
                ClipContent::Audio(audio) => println!(
                    "    [audio] \"{}\" {:.3}-{:.3}s source=\"{}\"",
                    clip.name, clip.range.start, clip.range.end, audio.source
                ),
            }
        }
        for (i, plugin) in track.plugins().iter().enumerate() {
            println!("    plugin {}: {} ({})", i, plugin.name(), plugin.identity.format());
        }
    }

    Ok(())
}

fn open(config: &EngineConfig, path: &Path) -> Result<Session> {
    let mut session = Session::new(config.clone())?;
    let report = session.open_edit(path)?;
    for line in report.render(false) {
        warn!("{}", line);
    }
    Ok(session)
}

fn run(config: &EngineConfig, path: &Path, command: &Command, mode: PathMode) -> Result<Outcome> {
    let mut session = open(config, path)?;

    let outcome = dispatch::dispatch(&mut session, command)?;
    match &outcome {
        Outcome::Applied => {
            session.save_active_edit(Some(path), mode)?;
            println!("Applied: {}", command);
        }
        Outcome::Ignored(reason) => println!("Ignored {}: {:?}", command.address, reason),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_then_insert() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.json");
        let config = EngineConfig::default();

        create_edit(&config, &path).unwrap();
        insert(&config, &path, Some("Foo")).unwrap();
        insert(&config, &path, Some("Foo")).unwrap();

        let edit = Edit::load(&path).unwrap();
        let clip = &edit.tracks()[0].clips()[0];
        assert_eq!(edit.tracks()[0].clips().len(), 1);
        assert_eq!(clip.sequence().unwrap().notes().len(), 2);
    }

    #[test]
    fn test_exec_parses_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.json");
        let config = EngineConfig::default();
        create_edit(&config, &path).unwrap();

        let outcome = exec(
            &config,
            &path,
            dispatch::SELECT_TRACK,
            &["bass".to_string()],
            PathMode::Relative,
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(Edit::load(&path).unwrap().tracks()[0].name, "bass");
    }

    #[test]
    fn test_add_plugin_to_named_track() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.json");
        let config = EngineConfig::default();
        create_edit(&config, &path).unwrap();

        add_plugin(&config, &path, "reverb", "", Some("fx")).unwrap();
        add_plugin(&config, &path, "REVERB", "tracktion", Some("fx")).unwrap();

        let edit = Edit::load(&path).unwrap();
        assert_eq!(edit.tracks().len(), 1);
        assert_eq!(edit.tracks()[0].name, "fx");
        assert_eq!(edit.tracks()[0].plugins().len(), 1);
    }
}
