/// Mock game data client for development and testing
use crate::data_provider::GameDataProvider;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

use crate::error::{GameError, GameResult};
use crate::fixtures;
use crate::types::{
    DataSlice, GameRequest, GameSummary, League, OddsEntry, PlayEntry, SocialPostEntry,
    StoryPayload,
};

/// Mock client that returns fixture data instead of calling a live feed
///
/// Individual slices can be made to fail or to answer late, which is how the
/// tests exercise partial failure and out-of-order completion.
#[derive(Debug, Default)]
pub struct MockClient {
    failing: Mutex<HashSet<DataSlice>>,
    delays: HashMap<DataSlice, Duration>,
    calls: [AtomicUsize; 5],
}

fn slot(slice: DataSlice) -> usize {
    match slice {
        DataSlice::Game => 0,
        DataSlice::Timeline => 1,
        DataSlice::Story => 2,
        DataSlice::SocialPosts => 3,
        DataSlice::Odds => 4,
    }
}

impl MockClient {
    /// Create a new mock client
    pub fn new() -> Self {
        info!("Creating MockClient for fixture data");
        Self::default()
    }

    /// Create a mock client whose given slices fail
    pub fn failing(slices: &[DataSlice]) -> Self {
        let client = Self::new();
        for slice in slices {
            client.set_failing(*slice, true);
        }
        client
    }

    /// Delay answers for one slice
    pub fn with_delay(mut self, slice: DataSlice, delay: Duration) -> Self {
        self.delays.insert(slice, delay);
        self
    }

    pub fn set_failing(&self, slice: DataSlice, failing: bool) {
        if let Ok(mut set) = self.failing.lock() {
            if failing {
                set.insert(slice);
            } else {
                set.remove(&slice);
            }
        }
    }

    /// Number of requests the client has answered for a slice
    pub fn calls(&self, slice: DataSlice) -> usize {
        self.calls[slot(slice)].load(Ordering::SeqCst)
    }

    async fn answer<T>(
        &self,
        slice: DataSlice,
        request: GameRequest,
        value: impl FnOnce() -> T + Send,
    ) -> GameResult<T> {
        self.calls[slot(slice)].fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&slice) {
            tokio::time::sleep(*delay).await;
        }
        let failing = self
            .failing
            .lock()
            .map(|set| set.contains(&slice))
            .unwrap_or(false);
        if failing {
            info!("MockClient: Failing {} for game {}", slice, request.id);
            return Err(GameError::Fetch {
                slice,
                message: "service unavailable".to_string(),
            });
        }
        info!("MockClient: Returning mock {} for game {}", slice, request.id);
        Ok(value())
    }
}

#[async_trait]
impl GameDataProvider for MockClient {
    async fn load_game(&self, request: GameRequest) -> GameResult<GameSummary> {
        self.answer(DataSlice::Game, request, || fixtures::create_mock_game_summary(request))
            .await
    }

    async fn load_timeline(&self, request: GameRequest) -> GameResult<Vec<PlayEntry>> {
        self.answer(DataSlice::Timeline, request, || fixtures::create_mock_plays(request.league))
            .await
    }

    async fn load_story(&self, request: GameRequest) -> GameResult<StoryPayload> {
        self.answer(DataSlice::Story, request, || fixtures::create_mock_story(request))
            .await
    }

    async fn load_social_posts(&self, request: GameRequest) -> GameResult<Vec<SocialPostEntry>> {
        self.answer(DataSlice::SocialPosts, request, || {
            fixtures::create_mock_social_posts(request.league)
        })
        .await
    }

    async fn load_odds(&self, request: GameRequest) -> GameResult<Vec<OddsEntry>> {
        // No odds coverage for college games
        if request.league == League::Ncaab {
            self.calls[slot(DataSlice::Odds)].fetch_add(1, Ordering::SeqCst);
            return Err(GameError::NotFound {
                slice: DataSlice::Odds,
                game_id: request.id.get(),
            });
        }
        self.answer(DataSlice::Odds, request, || {
            fixtures::create_mock_odds_updates(request.league)
        })
        .await
    }
}
