use crate::scroll::{ScrollMsg, SectionAnchor};
use crate::types::{
    DataSlice, GameId, GameRequest, GameSummary, League, OddsEntry, PlayEntry, SocialPostEntry,
    StoryPayload,
};

/// Screen actions - like Redux actions
///
/// All state changes of the game screen happen through actions.
/// Actions are dispatched from:
/// - The rendering layer (geometry reports, user intents)
/// - Effects (async data loading, preference reads and writes)
#[derive(Debug, Clone)]
pub enum Action {
    // Session actions
    OpenGame(GameRequest),
    /// Open from an unvalidated identifier (deep link, command line)
    OpenGameLink { raw_id: String, league: League },
    RefreshData,
    RetrySlice(DataSlice),

    // Data loaded (from effects)
    GameLoaded(GameId, Result<GameSummary, String>),
    TimelineLoaded(GameId, Result<Vec<PlayEntry>, String>),
    StoryLoaded(GameId, Result<StoryPayload, String>),
    SocialPostsLoaded(GameId, Result<Vec<SocialPostEntry>, String>),
    OddsLoaded(GameId, Result<Vec<OddsEntry>, String>),
    PreferencesLoaded {
        game_id: GameId,
        resume_marker: Option<u32>,
        social_opt_in: bool,
    },
    PreferencesSaved(Result<(), String>),

    // Geometry reports from the rendering layer
    Scroll(ScrollMsg),
    /// The rendering layer applied the pending scroll request
    ScrollConsumed,

    // User intents
    TogglePeriod(u32),
    ExpandAllPeriods,
    SelectSection(SectionAnchor),
    ResumeReading,
    StartOver,
    SetSocialOptIn(bool),

    // System actions
    SetStatusMessage { message: String, is_error: bool },
}

impl Action {
    /// Id of the game a loaded result belongs to, if this is a result action
    pub fn result_game_id(&self) -> Option<GameId> {
        match self {
            Self::GameLoaded(id, _)
            | Self::TimelineLoaded(id, _)
            | Self::StoryLoaded(id, _)
            | Self::SocialPostsLoaded(id, _)
            | Self::OddsLoaded(id, _) => Some(*id),
            Self::PreferencesLoaded { game_id, .. } => Some(*game_id),
            _ => None,
        }
    }
}
