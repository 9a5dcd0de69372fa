//! MIDI clip resolver

use log::{debug, info};

use crate::edit::{Clip, ClipKind, TimeRange, Track};

/// Length of a newly created MIDI clip, starting at 0.
pub const DEFAULT_CLIP_LENGTH: f64 = 4.0;

/// Return the first MIDI clip on `track` named exactly `name`, creating an
/// empty one if there is none. Audio clips are never returned, whatever
/// their name.
pub fn resolve_midi_clip<'t>(track: &'t mut Track, name: &str) -> &'t mut Clip {
    if let Some(index) = track
        .clips()
        .iter()
        .position(|c| c.kind() == ClipKind::Midi && c.name == name)
    {
        debug!("Clip select found existing MIDI clip: {}", name);
        return &mut track.clips_mut()[index];
    }

    info!("Creating MIDI clip \"{}\" on track: {}", name, track.name);
    track.insert_midi_clip(name, TimeRange::new(0.0, DEFAULT_CLIP_LENGTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::SourceReference;

    #[test]
    fn test_creates_default_range() {
        let mut track = Track::new("keys");
        let clip = resolve_midi_clip(&mut track, "intro");
        assert_eq!(clip.name, "intro");
        assert_eq!(clip.kind(), ClipKind::Midi);
        assert_eq!(clip.range, TimeRange::new(0.0, 4.0));
        assert!(clip.sequence().unwrap().notes().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let mut track = Track::new("keys");
        let first = resolve_midi_clip(&mut track, "intro").id;
        let second = resolve_midi_clip(&mut track, "intro").id;
        assert_eq!(first, second);
        assert_eq!(track.clips().len(), 1);
    }

    #[test]
    fn test_skips_audio_clip_with_same_name() {
        let mut track = Track::new("keys");
        let audio = track
            .insert_audio_reference("intro", SourceReference::new("/a.wav"), TimeRange::new(0.0, 2.0))
            .id;

        let midi = resolve_midi_clip(&mut track, "intro").id;
        assert_ne!(midi, audio);
        assert_eq!(track.clips().len(), 2);
        assert_eq!(track.clip(audio).unwrap().kind(), ClipKind::Audio);
        assert_eq!(track.clip(audio).unwrap().range, TimeRange::new(0.0, 2.0));
    }
}
