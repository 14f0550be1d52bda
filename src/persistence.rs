//! Team snapshot persistence
//!
//! The engine writes the four team records as an opaque JSON blob after
//! every applied command and reads it back once at startup. Where the blob
//! lives is up to the host, which plugs in a [`SnapshotStore`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    config::GameConfig,
    teams::{Teams, fresh_teams},
};

/// Errors raised by snapshot stores
#[derive(Debug, Error)]
pub enum Error {
    /// The backing storage could not be read or written
    #[error("snapshot storage failed: {0}")]
    Io(#[from] io::Error),
    /// The stored blob is not a valid snapshot
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Storage for the serialized team snapshot
///
/// Implementations might use a file, browser storage or a database row.
pub trait SnapshotStore {
    /// Reads the stored snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the storage cannot be read. A missing
    /// snapshot is `Ok(None)`, not an error.
    fn load(&self) -> Result<Option<String>, Error>;

    /// Replaces the stored snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the storage cannot be written.
    fn save(&mut self, snapshot: &str) -> Result<(), Error>;

    /// Deletes the stored snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the storage cannot be modified.
    fn clear(&mut self) -> Result<(), Error>;
}

/// Keeps the snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<String>,
}

impl MemoryStore {
    /// A store pre-loaded with `snapshot`
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: Some(snapshot.into()),
        }
    }

    /// The stored snapshot, if any
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, Error> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &str) -> Result<(), Error> {
        self.snapshot = Some(snapshot.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.snapshot = None;
        Ok(())
    }
}

/// Keeps the snapshot in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store backed by the file at `path`; the file need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, snapshot: &str) -> Result<(), Error> {
        fs::write(&self.path, snapshot)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Serializes the teams and writes them to the store
///
/// # Errors
///
/// Returns the store's error if the write fails.
pub fn save_teams<S: SnapshotStore + ?Sized>(store: &mut S, teams: &Teams) -> Result<(), Error> {
    store.save(&serde_json::to_string(teams)?)
}

fn load_teams<S: SnapshotStore + ?Sized>(store: &S) -> Result<Option<Teams>, Error> {
    store
        .load()?
        .map(|blob| serde_json::from_str(&blob))
        .transpose()
        .map_err(Error::from)
}

/// Loads the teams to start a session with
///
/// A stored snapshot is only resumed if every team still has at least the
/// configured starting time, so a game interrupted mid-play starts fresh.
/// Unreadable or malformed snapshots are treated as absent.
pub fn restore_teams<S: SnapshotStore + ?Sized>(store: &S, config: &GameConfig) -> Teams {
    match load_teams(store) {
        Ok(Some(teams))
            if teams
                .values()
                .all(|team| team.time_remaining >= config.initial_time) =>
        {
            tracing::info!("resuming saved teams");
            teams
        }
        Ok(Some(_)) => {
            tracing::warn!("saved teams are mid-game, starting fresh");
            fresh_teams(config)
        }
        Ok(None) => fresh_teams(config),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable saved teams");
            fresh_teams(config)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::teams::TeamId;

    #[test]
    fn test_memory_store_round_trip() {
        let config = GameConfig::default();
        let mut teams = fresh_teams(&config);
        teams[TeamId::C].points = 40;
        teams[TeamId::C].lifelines_used = 2;

        let mut store = MemoryStore::default();
        save_teams(&mut store, &teams).unwrap();
        assert_eq!(restore_teams(&store, &config), teams);

        store.clear().unwrap();
        assert!(store.snapshot().is_none());
        assert_eq!(restore_teams(&store, &config), fresh_teams(&config));
    }

    #[test]
    fn test_mid_game_snapshot_discarded() {
        let config = GameConfig::default();
        let mut teams = fresh_teams(&config);
        teams[TeamId::B].time_remaining = 119.9;
        teams[TeamId::A].points = 50;

        let mut store = MemoryStore::default();
        save_teams(&mut store, &teams).unwrap();
        assert_eq!(restore_teams(&store, &config), fresh_teams(&config));
    }

    #[test]
    fn test_malformed_snapshot_treated_as_absent() {
        let config = GameConfig::default();
        let store = MemoryStore::with_snapshot("{\"A\": not json");
        assert_eq!(restore_teams(&store, &config), fresh_teams(&config));

        let store = MemoryStore::with_snapshot("{\"A\": {}}");
        assert_eq!(restore_teams(&store, &config), fresh_teams(&config));
    }

    #[test]
    fn test_file_store() {
        let path = std::env::temp_dir().join(format!(
            "cognitive-clock-test-{}-{}.json",
            std::process::id(),
            fastrand::u64(..)
        ));
        let mut store = FileStore::new(&path);
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();

        store.save("{}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{}"));
        assert_eq!(store.path(), path.as_path());

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
