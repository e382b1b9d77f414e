//! Store module - JSON persistence under the user config dir
//!
//! Three files under `$XDG_CONFIG_HOME/chain-crush/` (falling back to
//! `~/.config/chain-crush/`): profiles.json, session.json,
//! tournaments.json. Loads degrade to defaults on missing or malformed
//! data so a wiped store never blocks the game; saves create the
//! directory as needed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::player::auth::SavedSession;
use crate::player::profile::ProfileBook;
use crate::tournament::TournamentBook;

const APP_DIR: &str = "chain-crush";
const PROFILES_FILE: &str = "profiles.json";
const SESSION_FILE: &str = "session.json";
const TOURNAMENTS_FILE: &str = "tournaments.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Config base dir: `$XDG_CONFIG_HOME`, else `~/.config`, else the
/// current directory.
fn config_base() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// File-per-collection JSON store rooted at one directory
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// The store at the resolved config location
    pub fn open_default() -> Self {
        Self {
            root: config_base().join(APP_DIR),
        }
    }

    /// A store rooted elsewhere (tests point this at a scratch dir)
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_profiles(&self) -> ProfileBook {
        self.load_or_default(PROFILES_FILE)
    }

    pub fn save_profiles(&self, book: &ProfileBook) -> Result<(), StoreError> {
        self.save(PROFILES_FILE, book)
    }

    /// The saved session, if one was stored and still parses. Expiry is
    /// the caller's check; the store only handles presence.
    pub fn load_session(&self) -> Option<SavedSession> {
        let bytes = fs::read(self.root.join(SESSION_FILE)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn save_session(&self, session: &SavedSession) -> Result<(), StoreError> {
        self.save(SESSION_FILE, session)
    }

    /// Remove the saved session; absent is fine.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.root.join(SESSION_FILE)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_tournaments(&self) -> TournamentBook {
        self.load_or_default(TOURNAMENTS_FILE)
    }

    pub fn save_tournaments(&self, book: &TournamentBook) -> Result<(), StoreError> {
        self.save(TOURNAMENTS_FILE, book)
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let bytes = match fs::read(self.root.join(file)) {
            Ok(bytes) => bytes,
            Err(_) => return T::default(),
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.root.join(file), json)?;
        Ok(())
    }
}
