use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::action::Action;
use crate::cache;
use crate::data_provider::GameDataProvider;
use crate::preferences::Preferences;
use crate::types::{DataSlice, GameId, GameRequest};

/// Side effects returned by the reducer
///
/// The reducer stays pure; everything that touches the data provider or the
/// preferences store is described here and executed by the runtime.
pub enum Effect {
    None,
    Action(Action),
    Batch(Vec<Effect>),
    Async(Pin<Box<dyn Future<Output = Action> + Send>>),
    /// Fetch a slice through the response cache
    Fetch(GameRequest, DataSlice),
    /// Fetch a slice, evicting any cached response first
    Refetch(GameRequest, DataSlice),
    LoadPreferences(GameId),
    SaveResumeMarker(GameId, u32),
    ClearResumeMarker(GameId),
    SaveSocialOptIn(GameId, bool),
}

impl Effect {
    /// Collapse a list of effects, dropping the no-ops
    pub fn batch(effects: Vec<Effect>) -> Effect {
        let mut effects: Vec<Effect> = effects
            .into_iter()
            .filter(|e| !matches!(e, Effect::None))
            .collect();
        match effects.len() {
            0 => Effect::None,
            1 => effects.remove(0),
            _ => Effect::Batch(effects),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => write!(f, "None"),
            Effect::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Effect::Batch(effects) => f.debug_tuple("Batch").field(effects).finish(),
            Effect::Async(_) => write!(f, "Async(..)"),
            Effect::Fetch(request, slice) => {
                f.debug_tuple("Fetch").field(request).field(slice).finish()
            }
            Effect::Refetch(request, slice) => {
                f.debug_tuple("Refetch").field(request).field(slice).finish()
            }
            Effect::LoadPreferences(id) => f.debug_tuple("LoadPreferences").field(id).finish(),
            Effect::SaveResumeMarker(id, index) => f
                .debug_tuple("SaveResumeMarker")
                .field(id)
                .field(index)
                .finish(),
            Effect::ClearResumeMarker(id) => {
                f.debug_tuple("ClearResumeMarker").field(id).finish()
            }
            Effect::SaveSocialOptIn(id, opt_in) => f
                .debug_tuple("SaveSocialOptIn")
                .field(id)
                .field(opt_in)
                .finish(),
        }
    }
}

/// Effect handler for data fetching and preference persistence
///
/// Each method returns an `Effect::Async` that resolves to the matching
/// result action.
pub struct DataEffects {
    client: Arc<dyn GameDataProvider>,
    preferences: Arc<dyn Preferences>,
    /// Latest marker requested per game; writers persist whatever is here
    /// when they run, so a slow older write cannot win over a newer one
    latest_marker: Arc<Mutex<HashMap<GameId, Option<u32>>>>,
    /// Held across reading `latest_marker` and writing it out, so marker
    /// writes never overlap
    marker_write: Arc<Mutex<()>>,
}

impl DataEffects {
    pub fn new(client: Arc<dyn GameDataProvider>, preferences: Arc<dyn Preferences>) -> Self {
        Self {
            client,
            preferences,
            latest_marker: Arc::new(Mutex::new(HashMap::new())),
            marker_write: Arc::new(Mutex::new(())),
        }
    }

    /// Fetch a slice (with caching)
    pub fn fetch(&self, request: GameRequest, slice: DataSlice) -> Effect {
        self.fetch_slice(request, slice, false)
    }

    /// Fetch a slice, bypassing the cache (used by retry)
    pub fn refetch(&self, request: GameRequest, slice: DataSlice) -> Effect {
        self.fetch_slice(request, slice, true)
    }

    fn fetch_slice(&self, request: GameRequest, slice: DataSlice, bypass_cache: bool) -> Effect {
        let client = self.client.clone();
        let id = request.id;
        Effect::Async(Box::pin(async move {
            let client = client.as_ref();
            match slice {
                DataSlice::Game => {
                    let result = if bypass_cache {
                        cache::refresh_game(client, request).await
                    } else {
                        cache::fetch_game_cached(client, request).await
                    };
                    Action::GameLoaded(id, result.map_err(|e| e.to_string()))
                }
                DataSlice::Timeline => {
                    let result = if bypass_cache {
                        cache::refresh_timeline(client, request).await
                    } else {
                        cache::fetch_timeline_cached(client, request).await
                    };
                    Action::TimelineLoaded(id, result.map_err(|e| e.to_string()))
                }
                DataSlice::Story => {
                    let result = if bypass_cache {
                        cache::refresh_story(client, request).await
                    } else {
                        cache::fetch_story_cached(client, request).await
                    };
                    Action::StoryLoaded(id, result.map_err(|e| e.to_string()))
                }
                DataSlice::SocialPosts => {
                    let result = if bypass_cache {
                        cache::refresh_social_posts(client, request).await
                    } else {
                        cache::fetch_social_posts_cached(client, request).await
                    };
                    Action::SocialPostsLoaded(id, result.map_err(|e| e.to_string()))
                }
                DataSlice::Odds => {
                    let result = if bypass_cache {
                        cache::refresh_odds(client, request).await
                    } else {
                        cache::fetch_odds_cached(client, request).await
                    };
                    Action::OddsLoaded(id, result.map_err(|e| e.to_string()))
                }
            }
        }))
    }

    /// Read the saved marker and the social opt-in for a game
    pub fn load_preferences(&self, game_id: GameId) -> Effect {
        let preferences = self.preferences.clone();
        Effect::Async(Box::pin(async move {
            let loaded = tokio::task::spawn_blocking(move || {
                (
                    preferences.load_resume_marker(game_id),
                    preferences.load_social_opt_in(game_id),
                )
            })
            .await;
            let (resume_marker, social_opt_in) = loaded.unwrap_or_else(|e| {
                warn!("PREFS: Loading preferences for game {} failed: {}", game_id, e);
                (None, false)
            });
            debug!(
                "PREFS: Game {} marker={:?} social_opt_in={}",
                game_id, resume_marker, social_opt_in
            );
            Action::PreferencesLoaded {
                game_id,
                resume_marker,
                social_opt_in,
            }
        }))
    }

    /// Persist the reading position; `None` clears it
    pub fn persist_marker(&self, game_id: GameId, marker: Option<u32>) -> Effect {
        if let Ok(mut latest) = self.latest_marker.lock() {
            latest.insert(game_id, marker);
        }
        let latest = self.latest_marker.clone();
        let marker_write = self.marker_write.clone();
        let preferences = self.preferences.clone();
        Effect::Async(Box::pin(async move {
            let written = tokio::task::spawn_blocking(move || {
                let _writing = marker_write.lock().unwrap_or_else(|e| e.into_inner());
                let marker = latest
                    .lock()
                    .ok()
                    .and_then(|latest| latest.get(&game_id).copied())
                    .unwrap_or(marker);
                match marker {
                    Some(sequence_index) => preferences.save_resume_marker(game_id, sequence_index),
                    None => preferences.clear_resume_marker(game_id),
                }
            })
            .await;
            Action::PreferencesSaved(flatten_write(written))
        }))
    }

    pub fn save_social_opt_in(&self, game_id: GameId, opt_in: bool) -> Effect {
        let preferences = self.preferences.clone();
        Effect::Async(Box::pin(async move {
            let written =
                tokio::task::spawn_blocking(move || preferences.save_social_opt_in(game_id, opt_in))
                    .await;
            Action::PreferencesSaved(flatten_write(written))
        }))
    }
}

fn flatten_write(
    written: Result<crate::error::GameResult<()>, tokio::task::JoinError>,
) -> Result<(), String> {
    match written {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("Preferences task failed: {}", e)),
    }
}
