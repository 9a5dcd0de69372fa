//! Source Reference Normalization
//!
//! Rewrites the source descriptor of every audio clip in an edit to a direct
//! file reference, either absolute or relative to the edit file. Used to make
//! edits relocatable before saving, and to give in-memory edits plain absolute
//! paths after loading.
//!
//! A clip whose descriptor cannot be resolved is counted and skipped; the pass
//! always visits every clip. Each clip produces one [`SourceEvent`], which
//! callers can render or ignore.

use std::fmt;
use std::path::Path;

use log::{debug, warn};
use uuid::Uuid;

use crate::edit::{Edit, PathMode, SourceResolver};
use crate::error::FluidError;

/// What happened to one audio clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// The descriptor was rewritten
    Updated {
        clip_id: Uuid,
        clip: String,
        before: String,
        after: String,
    },
    /// The descriptor was already in the requested form
    Unchanged {
        clip_id: Uuid,
        clip: String,
        source: String,
    },
    /// The descriptor does not map to any file
    Failed {
        clip_id: Uuid,
        clip: String,
        descriptor: String,
    },
}

impl fmt::Display for SourceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEvent::Updated { before, after, .. } => {
                write!(f, "Updated \"{}\" to \"{}\"", before, after)
            }
            SourceEvent::Unchanged { source, .. } => write!(f, "Unchanged path: {}", source),
            SourceEvent::Failed { clip, descriptor, .. } => write!(
                f,
                "Failed to find and update source clip: {} source=\"{}\"",
                clip, descriptor
            ),
        }
    }
}

/// Outcome of a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub mode: PathMode,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// One event per audio clip, in document order.
    pub events: Vec<SourceEvent>,
}

impl NormalizeReport {
    fn new(mode: PathMode) -> Self {
        Self {
            mode,
            updated: 0,
            unchanged: 0,
            failed: 0,
            events: Vec::new(),
        }
    }

    /// True when every audio clip was resolved.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Number of audio clips visited.
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.failed
    }

    /// One [`FluidError::UnresolvableReference`] per failed clip.
    pub fn failures(&self) -> impl Iterator<Item = FluidError> + '_ {
        self.events.iter().filter_map(|event| match event {
            SourceEvent::Failed { clip, descriptor, .. } => Some(FluidError::UnresolvableReference {
                clip: clip.clone(),
                descriptor: descriptor.clone(),
            }),
            _ => None,
        })
    }

    /// Human-readable lines. Failures are always included; the header and
    /// per-clip successes only when `verbose`.
    pub fn render(&self, verbose: bool) -> Vec<String> {
        let mut lines = Vec::new();
        if verbose {
            lines.push(format!(
                "Searching for audio clips and updating their sources to {} file paths",
                self.mode
            ));
        }
        for event in &self.events {
            match event {
                SourceEvent::Failed { .. } => lines.push(format!("ERROR: {}", event)),
                _ if verbose => lines.push(event.to_string()),
                _ => {}
            }
        }
        if !self.is_complete() {
            lines.push("ERROR: not all source clips could be identified!".to_string());
        }
        lines
    }
}

/// Rewrite every audio clip source in `edit` to `mode`.
///
/// Relative descriptors are resolved against, and rewritten relative to, the
/// edit file's directory. A descriptor pointing at a file that does not exist
/// is still rewritten; only descriptors `resolver` cannot map are failures.
pub fn normalize_sources<R>(edit: &mut Edit, resolver: &R, mode: PathMode) -> NormalizeReport
where
    R: SourceResolver + ?Sized,
{
    rewrite_sources(edit, resolver, mode, true)
}

/// Turn sources back into absolute paths after a relative write.
///
/// Same pass as [`normalize_sources`] in absolute mode, with unresolved
/// sources logged at debug level only.
pub fn restore_absolute_sources<R>(edit: &mut Edit, resolver: &R) -> NormalizeReport
where
    R: SourceResolver + ?Sized,
{
    rewrite_sources(edit, resolver, PathMode::Absolute, false)
}

fn rewrite_sources<R>(edit: &mut Edit, resolver: &R, mode: PathMode, warn_failures: bool) -> NormalizeReport
where
    R: SourceResolver + ?Sized,
{
    let edit_dir = edit.edit_dir().map(Path::to_path_buf);
    let mut report = NormalizeReport::new(mode);

    debug!(
        "Normalizing audio clip sources to {} paths in {} clip(s)",
        mode,
        edit.audio_clip_count()
    );

    for track in edit.tracks_mut() {
        for clip in track.clips_mut() {
            let clip_id = clip.id;
            let clip_name = clip.name.clone();
            let Some(audio) = clip.audio_mut() else {
                continue;
            };

            let Some(file) = resolver.resolve(&audio.source, edit_dir.as_deref()) else {
                if warn_failures {
                    warn!(
                        "Failed to find and update source clip: {} source=\"{}\"",
                        clip_name, audio.source
                    );
                } else {
                    debug!("Source still unresolved: {} source=\"{}\"", clip_name, audio.source);
                }
                report.failed += 1;
                report.events.push(SourceEvent::Failed {
                    clip_id,
                    clip: clip_name,
                    descriptor: audio.source.source.clone(),
                });
                continue;
            };

            let before = audio.source.source.clone();
            audio
                .source
                .set_to_direct_file_reference(&file, mode.is_relative(), edit_dir.as_deref());

            if before != audio.source.source {
                audio.source_media_changed();
                debug!("Updated \"{}\" to \"{}\"", before, audio.source);
                report.updated += 1;
                report.events.push(SourceEvent::Updated {
                    clip_id,
                    clip: clip_name,
                    before,
                    after: audio.source.source.clone(),
                });
            } else {
                debug!("Unchanged path: {}", before);
                report.unchanged += 1;
                report.events.push(SourceEvent::Unchanged {
                    clip_id,
                    clip: clip_name,
                    source: before,
                });
            }
        }
    }

    if warn_failures && !report.is_complete() {
        warn!(
            "Not all source clips could be identified ({} of {} failed); \
             check that project items are listed in the project library",
            report.failed,
            report.total()
        );
    }

    report
}
