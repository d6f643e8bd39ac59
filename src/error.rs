use thiserror::Error;

use crate::types::DataSlice;

/// Errors raised by the game screen core and its collaborators
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid game id '{0}'")]
    InvalidGameId(String),

    #[error("Unknown league '{0}'")]
    UnknownLeague(String),

    #[error("Failed to load {slice}: {message}")]
    Fetch { slice: DataSlice, message: String },

    #[error("No {slice} data for game {game_id}")]
    NotFound { slice: DataSlice, game_id: u64 },

    #[error("Preferences I/O error: {0}")]
    PreferencesIo(#[from] std::io::Error),

    #[error("Preferences file is malformed: {0}")]
    PreferencesParse(#[from] toml::de::Error),

    #[error("Failed to encode preferences: {0}")]
    PreferencesEncode(#[from] toml::ser::Error),

    #[error("Unable to determine the preferences directory")]
    NoPreferencesDir,
}

/// Result type for game screen operations
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_the_slice() {
        let err = GameError::Fetch {
            slice: DataSlice::SocialPosts,
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load social posts: timeout");
    }

    #[test]
    fn test_invalid_game_id_message() {
        let err = GameError::InvalidGameId("abc".to_string());
        assert_eq!(err.to_string(), "Invalid game id 'abc'");
    }
}
