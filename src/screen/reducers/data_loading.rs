use std::sync::Arc;
use tracing::{debug, warn};

use super::scroll::evaluate_resume;
use super::timeline::{rebuild_timeline, reveal_marker_period};
use crate::screen::action::Action;
use crate::screen::effects::Effect;
use crate::screen::state::{Availability, MarkerState, ScreenState};
use crate::types::{
    DataSlice, GameId, GameRequest, GameSummary, League, OddsEntry, PlayEntry, SocialPostEntry,
    StoryPayload,
};

/// Slices requested as soon as a game opens; social posts wait for the opt-in
const INITIAL_SLICES: [DataSlice; 4] = [
    DataSlice::Game,
    DataSlice::Timeline,
    DataSlice::Story,
    DataSlice::Odds,
];

/// Handle session and data loading actions
///
/// Returns Ok((new_state, effect)) if the action was handled,
/// or Err(state) to pass ownership back to the caller.
pub fn reduce_data_loading(
    state: ScreenState,
    action: &Action,
) -> Result<(ScreenState, Effect), ScreenState> {
    // Results for a game that is no longer open are discarded
    if let Some(game_id) = action.result_game_id() {
        if !is_open_game(&state, game_id) {
            debug!("DATA: Discarding stale result for game {}", game_id);
            return Ok((state, Effect::None));
        }
    }

    match action {
        Action::OpenGame(request) => Ok(open_game(state, *request)),
        Action::OpenGameLink { raw_id, league } => Ok(open_game_link(state, raw_id, *league)),
        Action::RefreshData => Ok(refresh_data(state)),
        Action::RetrySlice(slice) => Ok(retry_slice(state, *slice)),
        Action::GameLoaded(_, result) => Ok(handle_game_loaded(state, result.clone())),
        Action::TimelineLoaded(_, result) => Ok(handle_timeline_loaded(state, result.clone())),
        Action::StoryLoaded(_, result) => Ok(handle_story_loaded(state, result.clone())),
        Action::SocialPostsLoaded(_, result) => {
            Ok(handle_social_posts_loaded(state, result.clone()))
        }
        Action::OddsLoaded(_, result) => Ok(handle_odds_loaded(state, result.clone())),
        Action::PreferencesLoaded {
            resume_marker,
            social_opt_in,
            ..
        } => Ok(handle_preferences_loaded(state, *resume_marker, *social_opt_in)),
        Action::PreferencesSaved(result) => Ok(handle_preferences_saved(state, result)),
        Action::SetSocialOptIn(opt_in) => Ok(set_social_opt_in(state, *opt_in)),
        _ => Err(state),
    }
}

fn is_open_game(state: &ScreenState, game_id: GameId) -> bool {
    state.session.availability == Availability::Open
        && state.session.request.map(|r| r.id) == Some(game_id)
}

fn open_game(state: ScreenState, request: GameRequest) -> (ScreenState, Effect) {
    debug!("DATA: Opening {} game {}", request.league, request.id);
    let mut new_state = state.reset();
    new_state.session.request = Some(request);
    new_state.session.availability = Availability::Open;

    let mut effects = Vec::with_capacity(INITIAL_SLICES.len() + 1);
    for slice in INITIAL_SLICES {
        new_state.data.begin_loading(slice);
        effects.push(Effect::Fetch(request, slice));
    }
    effects.push(Effect::LoadPreferences(request.id));
    (new_state, Effect::Batch(effects))
}

fn open_game_link(state: ScreenState, raw_id: &str, league: League) -> (ScreenState, Effect) {
    match GameId::parse(raw_id) {
        Ok(id) => open_game(state, GameRequest::new(id, league)),
        Err(e) => {
            warn!("DATA: Refusing to open game: {}", e);
            let mut new_state = state.reset();
            new_state.session.availability = Availability::Unavailable(e.to_string());
            new_state
                .system
                .set_status_error_message(format!("Game unavailable: {}", e));
            (new_state, Effect::None)
        }
    }
}

/// Slices this session asks for
fn requested_slices(state: &ScreenState) -> Vec<DataSlice> {
    let mut slices = INITIAL_SLICES.to_vec();
    if state.session.social_opt_in {
        slices.push(DataSlice::SocialPosts);
    }
    slices
}

fn refresh_data(state: ScreenState) -> (ScreenState, Effect) {
    let mut new_state = state;
    let Some(request) = new_state.session.request.filter(|_| {
        new_state.session.availability == Availability::Open
    }) else {
        return (new_state, Effect::None);
    };
    debug!("DATA: Refreshing game {}", request.id);
    let mut effects = Vec::new();
    for slice in requested_slices(&new_state) {
        new_state.data.begin_loading(slice);
        effects.push(Effect::Fetch(request, slice));
    }
    (new_state, Effect::batch(effects))
}

fn retry_slice(state: ScreenState, slice: DataSlice) -> (ScreenState, Effect) {
    let mut new_state = state;
    let Some(request) = new_state.session.request.filter(|_| {
        new_state.session.availability == Availability::Open
    }) else {
        return (new_state, Effect::None);
    };
    if slice == DataSlice::SocialPosts && !new_state.session.social_opt_in {
        debug!("DATA: Not retrying social posts without opt-in");
        return (new_state, Effect::None);
    }
    debug!("DATA: Retrying {} for game {}", slice, request.id);
    new_state.data.begin_loading(slice);
    (new_state, Effect::Refetch(request, slice))
}

fn handle_game_loaded(state: ScreenState, result: Result<GameSummary, String>) -> (ScreenState, Effect) {
    let mut new_state = state;
    match result {
        Ok(game) => {
            debug!("DATA: Loaded game {} {} @ {}", game.id, game.away.abbrev, game.home.abbrev);
            new_state.data.game = Arc::new(Some(game));
            new_state.data.finish_loading(DataSlice::Game, Ok(()));
        }
        Err(e) => {
            debug!("DATA: Failed to load game: {}", e);
            new_state.data.finish_loading(DataSlice::Game, Err(e));
        }
    }
    (new_state, Effect::None)
}

fn handle_story_loaded(state: ScreenState, result: Result<StoryPayload, String>) -> (ScreenState, Effect) {
    let mut new_state = state;
    match result {
        Ok(story) => {
            debug!("DATA: Loaded story '{}'", story.headline);
            new_state.data.story = Arc::new(Some(story));
            new_state.data.finish_loading(DataSlice::Story, Ok(()));
        }
        Err(e) => {
            debug!("DATA: Failed to load story: {}", e);
            new_state.data.story = Arc::new(None);
            new_state.data.finish_loading(DataSlice::Story, Err(e));
        }
    }
    (new_state, Effect::None)
}

fn handle_timeline_loaded(
    state: ScreenState,
    result: Result<Vec<PlayEntry>, String>,
) -> (ScreenState, Effect) {
    let mut new_state = state;
    match result {
        Ok(plays) => {
            debug!("DATA: Loaded {} plays", plays.len());
            new_state.data.plays = Arc::new(plays);
            new_state.data.finish_loading(DataSlice::Timeline, Ok(()));
        }
        Err(e) => {
            debug!("DATA: Failed to load play-by-play: {}", e);
            new_state.data.plays = Arc::new(Vec::new());
            new_state.data.finish_loading(DataSlice::Timeline, Err(e));
        }
    }
    (evaluate_resume(rebuild_timeline(new_state)), Effect::None)
}

fn handle_social_posts_loaded(
    state: ScreenState,
    result: Result<Vec<SocialPostEntry>, String>,
) -> (ScreenState, Effect) {
    let mut new_state = state;
    if !new_state.session.social_opt_in {
        debug!("DATA: Discarding social posts after opt-out");
        new_state.data.loading.remove(&DataSlice::SocialPosts);
        return (new_state, Effect::None);
    }
    match result {
        Ok(posts) => {
            debug!("DATA: Loaded {} social posts", posts.len());
            new_state.data.social_posts = Arc::new(posts);
            new_state.data.finish_loading(DataSlice::SocialPosts, Ok(()));
        }
        Err(e) => {
            debug!("DATA: Failed to load social posts: {}", e);
            new_state.data.social_posts = Arc::new(Vec::new());
            new_state.data.finish_loading(DataSlice::SocialPosts, Err(e));
        }
    }
    (evaluate_resume(rebuild_timeline(new_state)), Effect::None)
}

fn handle_odds_loaded(
    state: ScreenState,
    result: Result<Vec<OddsEntry>, String>,
) -> (ScreenState, Effect) {
    let mut new_state = state;
    match result {
        Ok(odds) => {
            debug!("DATA: Loaded {} odds updates", odds.len());
            new_state.data.odds = Arc::new(odds);
            new_state.data.finish_loading(DataSlice::Odds, Ok(()));
        }
        Err(e) => {
            debug!("DATA: Failed to load odds: {}", e);
            new_state.data.odds = Arc::new(Vec::new());
            new_state.data.finish_loading(DataSlice::Odds, Err(e));
        }
    }
    (evaluate_resume(rebuild_timeline(new_state)), Effect::None)
}

fn handle_preferences_loaded(
    state: ScreenState,
    resume_marker: Option<u32>,
    social_opt_in: bool,
) -> (ScreenState, Effect) {
    let mut new_state = state;
    // The marker is read once per session; later writes are our own
    if !new_state.scroll.marker.is_loaded() {
        new_state.scroll.marker = MarkerState::Loaded(resume_marker);
    }
    new_state.session.social_opt_in = social_opt_in;

    let effect = match new_state.session.request {
        Some(request)
            if social_opt_in
                && !new_state.data.loading.contains(&DataSlice::SocialPosts)
                && !new_state.data.is_settled(DataSlice::SocialPosts) =>
        {
            new_state.data.begin_loading(DataSlice::SocialPosts);
            Effect::Fetch(request, DataSlice::SocialPosts)
        }
        _ => Effect::None,
    };

    let new_state = reveal_marker_period(new_state);
    (evaluate_resume(new_state), effect)
}

fn handle_preferences_saved(state: ScreenState, result: &Result<(), String>) -> (ScreenState, Effect) {
    let mut new_state = state;
    if let Err(e) = result {
        warn!("PREFS: Failed to save preferences: {}", e);
        new_state
            .system
            .set_status_error_message(format!("Failed to save preferences: {}", e));
    }
    (new_state, Effect::None)
}

fn set_social_opt_in(state: ScreenState, opt_in: bool) -> (ScreenState, Effect) {
    let mut new_state = state;
    let Some(request) = new_state.session.request.filter(|_| {
        new_state.session.availability == Availability::Open
    }) else {
        return (new_state, Effect::None);
    };
    if new_state.session.social_opt_in == opt_in {
        return (new_state, Effect::None);
    }
    debug!("DATA: Social opt-in for game {} = {}", request.id, opt_in);
    new_state.session.social_opt_in = opt_in;
    let save = Effect::SaveSocialOptIn(request.id, opt_in);

    if opt_in {
        new_state.data.begin_loading(DataSlice::SocialPosts);
        return (
            new_state,
            Effect::batch(vec![save, Effect::Fetch(request, DataSlice::SocialPosts)]),
        );
    }

    new_state.data.social_posts = Arc::new(Vec::new());
    new_state.data.loading.remove(&DataSlice::SocialPosts);
    new_state.data.loaded.remove(&DataSlice::SocialPosts);
    new_state.data.errors.remove(&DataSlice::SocialPosts);
    (rebuild_timeline(new_state), save)
}
