use crate::data_provider::GameDataProvider;
use crate::error::GameError;
use crate::types::{GameRequest, GameSummary, OddsEntry, PlayEntry, SocialPostEntry, StoryPayload};
use cached::proc_macro::cached;

pub use cached::Cached;

#[cfg(test)]
pub async fn clear_all_caches() {
    GAME_CACHE.lock().await.cache_clear();
    TIMELINE_CACHE.lock().await.cache_clear();
    STORY_CACHE.lock().await.cache_clear();
    SOCIAL_CACHE.lock().await.cache_clear();
    ODDS_CACHE.lock().await.cache_clear();
}

#[cfg(test)]
#[derive(Debug)]
pub struct CacheStats {
    pub game_entries: usize,
    pub timeline_entries: usize,
    pub story_entries: usize,
    pub social_entries: usize,
    pub odds_entries: usize,
}

#[cfg(test)]
pub async fn cache_stats() -> CacheStats {
    CacheStats {
        game_entries: GAME_CACHE.lock().await.cache_size(),
        timeline_entries: TIMELINE_CACHE.lock().await.cache_size(),
        story_entries: STORY_CACHE.lock().await.cache_size(),
        social_entries: SOCIAL_CACHE.lock().await.cache_size(),
        odds_entries: ODDS_CACHE.lock().await.cache_size(),
    }
}

#[cached(
    name = "GAME_CACHE",
    type = "cached::TimedSizedCache<GameRequest, GameSummary>",
    create = "{ cached::TimedSizedCache::with_size_and_lifespan(50, 30) }",
    convert = r#"{ request }"#,
    result = true
)]
pub async fn fetch_game_cached(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<GameSummary, GameError> {
    client.load_game(request).await
}

// Live play-by-play moves quickly; keep it short-lived
#[cached(
    name = "TIMELINE_CACHE",
    type = "cached::TimedSizedCache<GameRequest, Vec<PlayEntry>>",
    create = "{ cached::TimedSizedCache::with_size_and_lifespan(20, 15) }",
    convert = r#"{ request }"#,
    result = true
)]
pub async fn fetch_timeline_cached(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<Vec<PlayEntry>, GameError> {
    client.load_timeline(request).await
}

#[cached(
    name = "STORY_CACHE",
    type = "cached::TimedSizedCache<GameRequest, StoryPayload>",
    create = "{ cached::TimedSizedCache::with_size_and_lifespan(20, 600) }",
    convert = r#"{ request }"#,
    result = true
)]
pub async fn fetch_story_cached(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<StoryPayload, GameError> {
    client.load_story(request).await
}

#[cached(
    name = "SOCIAL_CACHE",
    type = "cached::TimedSizedCache<GameRequest, Vec<SocialPostEntry>>",
    create = "{ cached::TimedSizedCache::with_size_and_lifespan(20, 60) }",
    convert = r#"{ request }"#,
    result = true
)]
pub async fn fetch_social_posts_cached(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<Vec<SocialPostEntry>, GameError> {
    client.load_social_posts(request).await
}

#[cached(
    name = "ODDS_CACHE",
    type = "cached::TimedSizedCache<GameRequest, Vec<OddsEntry>>",
    create = "{ cached::TimedSizedCache::with_size_and_lifespan(20, 60) }",
    convert = r#"{ request }"#,
    result = true
)]
pub async fn fetch_odds_cached(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<Vec<OddsEntry>, GameError> {
    client.load_odds(request).await
}

pub async fn refresh_game(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<GameSummary, GameError> {
    GAME_CACHE.lock().await.cache_remove(&request);
    fetch_game_cached(client, request).await
}

pub async fn refresh_timeline(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<Vec<PlayEntry>, GameError> {
    TIMELINE_CACHE.lock().await.cache_remove(&request);
    fetch_timeline_cached(client, request).await
}

pub async fn refresh_story(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<StoryPayload, GameError> {
    STORY_CACHE.lock().await.cache_remove(&request);
    fetch_story_cached(client, request).await
}

pub async fn refresh_social_posts(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<Vec<SocialPostEntry>, GameError> {
    SOCIAL_CACHE.lock().await.cache_remove(&request);
    fetch_social_posts_cached(client, request).await
}

pub async fn refresh_odds(
    client: &dyn GameDataProvider,
    request: GameRequest,
) -> Result<Vec<OddsEntry>, GameError> {
    ODDS_CACHE.lock().await.cache_remove(&request);
    fetch_odds_cached(client, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::mock_client::MockClient;
    use crate::screen::testing::unique_request;
    use crate::types::{DataSlice, League};

    #[tokio::test]
    async fn test_timeline_cache_hit_skips_client() {
        let client = MockClient::new();
        let request = unique_request(League::Nhl);

        let first = fetch_timeline_cached(&client, request).await.unwrap();
        let second = fetch_timeline_cached(&client, request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.calls(DataSlice::Timeline), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let client = MockClient::failing(&[DataSlice::Odds]);
        let request = unique_request(League::Nba);

        assert!(fetch_odds_cached(&client, request).await.is_err());
        client.set_failing(DataSlice::Odds, false);
        assert!(fetch_odds_cached(&client, request).await.is_ok());
        assert_eq!(client.calls(DataSlice::Odds), 2);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cached_entry() {
        let client = MockClient::new();
        let request = unique_request(League::Nhl);

        fetch_game_cached(&client, request).await.unwrap();
        refresh_game(&client, request).await.unwrap();
        fetch_game_cached(&client, request).await.unwrap();

        assert_eq!(client.calls(DataSlice::Game), 2);
    }

    #[tokio::test]
    async fn test_cache_keys_include_league() {
        let client = MockClient::new();
        let nhl = unique_request(League::Nhl);
        let nba = GameRequest::new(nhl.id, League::Nba);

        let hockey = fetch_social_posts_cached(&client, nhl).await.unwrap();
        let basketball = fetch_social_posts_cached(&client, nba).await.unwrap();

        assert_ne!(hockey, basketball);
        assert_eq!(client.calls(DataSlice::SocialPosts), 2);
    }

    #[tokio::test]
    #[ignore] // Shared cache state - run individually
    async fn test_clear_all_caches() {
        let client = MockClient::new();
        let request = unique_request(League::Nhl);

        let _ = fetch_story_cached(&client, request).await;
        assert!(cache_stats().await.story_entries > 0);

        clear_all_caches().await;

        let stats = cache_stats().await;
        assert_eq!(stats.game_entries, 0);
        assert_eq!(stats.story_entries, 0);
    }
}
