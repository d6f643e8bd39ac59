//! Persisted per-game preferences: the resume marker and the social opt-in.
//!
//! The screen only talks to the narrow `Preferences` trait. `FilePreferences`
//! keeps everything in one TOML file under the XDG data directory.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::config;
use crate::error::{GameError, GameResult};
use crate::types::GameId;

const PREFERENCES_FILE: &str = "preferences.toml";

pub trait Preferences: Send + Sync {
    /// Sequence index of the last play viewed, if any
    fn load_resume_marker(&self, game_id: GameId) -> Option<u32>;

    fn save_resume_marker(&self, game_id: GameId, sequence_index: u32) -> GameResult<()>;

    fn clear_resume_marker(&self, game_id: GameId) -> GameResult<()>;

    fn load_social_opt_in(&self, game_id: GameId) -> bool;

    fn save_social_opt_in(&self, game_id: GameId, opt_in: bool) -> GameResult<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct GamePreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_marker: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    social_opt_in: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PreferencesFile {
    games: BTreeMap<String, GamePreferences>,
}

/// In-process preferences for tests and fixture runs
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    games: Mutex<HashMap<GameId, GamePreferences>>,
    default_opt_in: bool,
}

impl MemoryPreferences {
    pub fn new(default_opt_in: bool) -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            default_opt_in,
        }
    }

    /// Seed a saved marker, as if a previous session had stored it
    pub fn with_marker(self, game_id: GameId, sequence_index: u32) -> Self {
        if let Ok(mut games) = self.games.lock() {
            games.entry(game_id).or_default().resume_marker = Some(sequence_index);
        }
        self
    }

    fn update(&self, game_id: GameId, f: impl FnOnce(&mut GamePreferences)) -> GameResult<()> {
        let mut games = self
            .games
            .lock()
            .map_err(|_| GameError::PreferencesIo(std::io::Error::other("preferences lock poisoned")))?;
        f(games.entry(game_id).or_default());
        Ok(())
    }

    fn get(&self, game_id: GameId) -> GamePreferences {
        self.games
            .lock()
            .ok()
            .and_then(|games| games.get(&game_id).copied())
            .unwrap_or_default()
    }
}

impl Preferences for MemoryPreferences {
    fn load_resume_marker(&self, game_id: GameId) -> Option<u32> {
        self.get(game_id).resume_marker
    }

    fn save_resume_marker(&self, game_id: GameId, sequence_index: u32) -> GameResult<()> {
        self.update(game_id, |prefs| prefs.resume_marker = Some(sequence_index))
    }

    fn clear_resume_marker(&self, game_id: GameId) -> GameResult<()> {
        self.update(game_id, |prefs| prefs.resume_marker = None)
    }

    fn load_social_opt_in(&self, game_id: GameId) -> bool {
        self.get(game_id).social_opt_in.unwrap_or(self.default_opt_in)
    }

    fn save_social_opt_in(&self, game_id: GameId, opt_in: bool) -> GameResult<()> {
        self.update(game_id, |prefs| prefs.social_opt_in = Some(opt_in))
    }
}

/// Preferences stored in a TOML file, one table per game
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    default_opt_in: bool,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>, default_opt_in: bool) -> Self {
        Self {
            path: path.into(),
            default_opt_in,
            write_lock: Mutex::new(()),
        }
    }

    /// Preferences file in the XDG data directory
    pub fn open_default(default_opt_in: bool) -> GameResult<Self> {
        let dir = config::get_data_dir().ok_or(GameError::NoPreferencesDir)?;
        Ok(Self::new(dir.join(PREFERENCES_FILE), default_opt_in))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> GameResult<PreferencesFile> {
        if !self.path.exists() {
            return Ok(PreferencesFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn game(&self, game_id: GameId) -> GamePreferences {
        match self.read_file() {
            Ok(file) => file
                .games
                .get(&game_id.to_string())
                .copied()
                .unwrap_or_default(),
            Err(e) => {
                warn!("PREFS: Failed to read {}: {}", self.path.display(), e);
                GamePreferences::default()
            }
        }
    }

    fn update(&self, game_id: GameId, f: impl FnOnce(&mut GamePreferences)) -> GameResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| GameError::PreferencesIo(std::io::Error::other("preferences lock poisoned")))?;

        let mut file = self.read_file()?;
        let key = game_id.to_string();
        let entry = file.games.entry(key.clone()).or_default();
        f(entry);
        if *entry == GamePreferences::default() {
            file.games.remove(&key);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write next to the target and rename so readers never see a partial file
        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, toml::to_string(&file)?)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("PREFS: Saved preferences for game {}", game_id);
        Ok(())
    }
}

impl Preferences for FilePreferences {
    fn load_resume_marker(&self, game_id: GameId) -> Option<u32> {
        self.game(game_id).resume_marker
    }

    fn save_resume_marker(&self, game_id: GameId, sequence_index: u32) -> GameResult<()> {
        self.update(game_id, |prefs| prefs.resume_marker = Some(sequence_index))
    }

    fn clear_resume_marker(&self, game_id: GameId) -> GameResult<()> {
        self.update(game_id, |prefs| prefs.resume_marker = None)
    }

    fn load_social_opt_in(&self, game_id: GameId) -> bool {
        self.game(game_id).social_opt_in.unwrap_or(self.default_opt_in)
    }

    fn save_social_opt_in(&self, game_id: GameId, opt_in: bool) -> GameResult<()> {
        self.update(game_id, |prefs| prefs.social_opt_in = Some(opt_in))
    }
}
