/// Trait for providing game data, abstracting over real fetch services and mock implementations
use async_trait::async_trait;

use crate::error::GameResult;
use crate::types::{GameRequest, GameSummary, OddsEntry, PlayEntry, SocialPostEntry, StoryPayload};

/// Data-fetch collaborator for the game screen
///
/// Every call is independently awaitable and independently failable; the
/// screen never waits on one slice to request another.
#[async_trait]
pub trait GameDataProvider: Send + Sync {
    /// Get the game summary (teams, score, status)
    async fn load_game(&self, request: GameRequest) -> GameResult<GameSummary>;

    /// Get play-by-play entries in source order
    async fn load_timeline(&self, request: GameRequest) -> GameResult<Vec<PlayEntry>>;

    /// Get the pregame preview or postgame recap
    async fn load_story(&self, request: GameRequest) -> GameResult<StoryPayload>;

    /// Get social posts about the game (only requested after opt-in)
    async fn load_social_posts(&self, request: GameRequest) -> GameResult<Vec<SocialPostEntry>>;

    /// Get betting line movements
    async fn load_odds(&self, request: GameRequest) -> GameResult<Vec<OddsEntry>>;
}
