//! JSON snapshot persistence for sessions.
//!
//! Loading is deliberately forgiving: a missing file starts a fresh
//! session, and an unparsable one is discarded with a warning instead of
//! failing the boot. Field-level defaults inside the save format handle
//! snapshots written by older versions.

use std::fs;
use std::io;
use std::path::Path;

use orepit_world::save::{self, SaveState};
use orepit_world::World;
use thiserror::Error;

/// Errors that can occur while writing a session snapshot.
#[derive(Debug, Error)]
pub(crate) enum SnapshotError {
    /// The snapshot file could not be written.
    #[error("could not write snapshot file: {0}")]
    Io(#[from] io::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Loads a world from the snapshot at `path`, falling back to defaults.
pub(crate) fn load(path: &Path) -> World {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return World::new(),
        Err(error) => {
            eprintln!(
                "warning: could not read snapshot {}: {error}; starting fresh",
                path.display()
            );
            return World::new();
        }
    };

    match serde_json::from_str::<SaveState>(&contents) {
        Ok(state) => save::restore(&state),
        Err(error) => {
            eprintln!(
                "warning: discarding unparsable snapshot {}: {error}",
                path.display()
            );
            World::new()
        }
    }
}

/// Writes the provided world to the snapshot at `path`.
pub(crate) fn store(path: &Path, world: &World) -> Result<(), SnapshotError> {
    let state = save::capture(world);
    let json = serde_json::to_string_pretty(&state)?;
    fs::write(path, json)?;
    Ok(())
}
