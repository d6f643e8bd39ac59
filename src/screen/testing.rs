//! General test utilities for screen tests.
//!
//! The response caches are process-wide, so tests that go through the runtime
//! or the effects should open games with `unique_request` to stay isolated.

use ratatui::layout::Rect;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::effects::DataEffects;
use super::reducers::rebuild_timeline;
use super::runtime::Runtime;
use super::state::{Availability, ScreenState};
use crate::dev::mock_client::MockClient;
use crate::fixtures;
use crate::preferences::{MemoryPreferences, Preferences};
use crate::types::{DataSlice, GameId, GameRequest, League};

/// Ids handed out by `unique_game_id`, well clear of the fixture ids
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(9_000_000_001);

/// Creates an Arc-wrapped mock client for testing.
pub fn create_client() -> Arc<MockClient> {
    Arc::new(MockClient::new())
}

/// A game id no other test in this process uses
pub fn unique_game_id() -> GameId {
    let id = NEXT_GAME_ID.fetch_add(1, Ordering::SeqCst);
    GameId::new(id).expect("counter starts above zero")
}

pub fn unique_request(league: League) -> GameRequest {
    GameRequest::new(unique_game_id(), league)
}

/// The fixture hockey game; only for reducer tests that never fetch
pub fn hockey_request() -> GameRequest {
    let id = GameId::new(fixtures::NHL_FIXTURE_GAME).expect("fixture id is valid");
    GameRequest::new(id, League::Nhl)
}

/// Full-width rectangle `height` rows tall starting at row `y`
pub fn rows(y: u16, height: u16) -> Rect {
    Rect {
        x: 0,
        y,
        width: 80,
        height,
    }
}

/// Open hockey game with every slice loaded and social opted in
///
/// Preferences have not answered yet, so the marker is unknown and the resume
/// prompt is still pending.
pub fn hockey_state() -> ScreenState {
    let request = hockey_request();
    let mut state = ScreenState::default();
    state.session.request = Some(request);
    state.session.availability = Availability::Open;
    state.session.social_opt_in = true;

    state.data.game = Arc::new(Some(fixtures::create_mock_game_summary(request)));
    state.data.story = Arc::new(Some(fixtures::create_mock_story(request)));
    state.data.plays = Arc::new(fixtures::create_mock_plays(League::Nhl));
    state.data.social_posts = Arc::new(fixtures::create_mock_social_posts(League::Nhl));
    state.data.odds = Arc::new(fixtures::create_mock_odds_updates(League::Nhl));
    for slice in DataSlice::ALL {
        state.data.finish_loading(slice, Ok(()));
    }
    rebuild_timeline(state)
}

pub fn create_runtime() -> Runtime {
    create_runtime_with(create_client(), Arc::new(MemoryPreferences::default()))
}

pub fn create_runtime_with(client: Arc<MockClient>, preferences: Arc<dyn Preferences>) -> Runtime {
    let data_effects = Arc::new(DataEffects::new(client, preferences));
    Runtime::new(ScreenState::default(), data_effects)
}
