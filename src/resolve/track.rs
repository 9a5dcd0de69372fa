//! Track resolver

use log::{debug, info};

use crate::edit::{Edit, InsertPoint, Track};

/// Return the first track named exactly `name`, appending a new one if there
/// is none.
pub fn resolve_track<'e>(edit: &'e mut Edit, name: &str) -> &'e mut Track {
    if let Some(index) = edit.tracks().iter().position(|t| t.name == name) {
        debug!("Track select found existing track: {}", name);
        return &mut edit.tracks_mut()[index];
    }

    info!("Creating track: {}", name);
    edit.insert_track(name, InsertPoint::End)
}
