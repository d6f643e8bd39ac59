use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::config::Config;
use crate::scroll::{ResumePrompt, ScrollTracker, SectionAnchor};
use crate::timeline::{
    default_collapsed_periods, AggregateOptions, AggregatedTimeline, PeriodExpansion, PeriodGroup,
    TimelineEvent,
};
use crate::types::{
    DataSlice, GameRequest, GameSummary, OddsEntry, PlayEntry, SocialPostEntry, StoryPayload,
};

/// Root screen state - single source of truth
///
/// All state changes happen through the reducer. The rendering layer only
/// ever sees a `ScreenSnapshot`.
#[derive(Debug, Clone, Default)]
pub struct ScreenState {
    /// Which game is open and whether it can be shown
    pub session: SessionState,

    /// Fetched slices
    pub data: DataState,

    /// Aggregated timeline and period expansion
    pub timeline: TimelineState,

    /// Geometry, resume prompt and scroll requests
    pub scroll: ScrollState,

    /// System state
    pub system: SystemState,
}

impl ScreenState {
    /// Fresh state tuned by the configuration
    pub fn new(config: &Config) -> Self {
        Self {
            session: SessionState {
                social_opt_in: config.social.default_opt_in,
                ..Default::default()
            },
            data: DataState::default(),
            timeline: TimelineState {
                options: config.timeline.aggregate_options(),
                ..Default::default()
            },
            scroll: ScrollState {
                tracker: ScrollTracker::new(config.scroll.section_offset_band),
                resume: ResumePrompt::new(config.scroll.resume_tolerance),
                ..Default::default()
            },
            system: SystemState {
                config: config.clone(),
                ..Default::default()
            },
        }
    }

    /// Empty state for another game, keeping configuration
    pub fn reset(&self) -> Self {
        Self::new(&self.system.config)
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        let timeline = Arc::clone(&self.timeline.aggregated);
        ScreenSnapshot {
            availability: self.session.availability.clone(),
            request: self.session.request,
            game: Arc::clone(&self.data.game),
            story: Arc::clone(&self.data.story),
            default_collapsed_periods: default_collapsed_periods(&timeline.groups),
            collapsed: self.timeline.expansion.collapsed().clone(),
            timeline,
            current_section: self.scroll.tracker.current_section(),
            should_prompt_resume: self.scroll.resume.is_shown(),
            resume_marker: self.scroll.marker.saved(),
            pending_scroll: self.scroll.pending_scroll,
            social_opt_in: self.session.social_opt_in,
            slices: DataSlice::ALL
                .iter()
                .map(|slice| (*slice, self.data.status(*slice)))
                .collect(),
            status_message: self.system.status_message.clone(),
            status_is_error: self.system.status_is_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Availability {
    /// No game opened yet
    #[default]
    Idle,
    Open,
    /// Terminal for the session; the reason is shown to the user
    Unavailable(String),
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub request: Option<GameRequest>,
    pub availability: Availability,
    /// Social posts are only requested once the user opted in for this game
    pub social_opt_in: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DataState {
    // Slices - wrapped in Arc to avoid deep clones on every reducer call
    pub game: Arc<Option<GameSummary>>,
    pub plays: Arc<Vec<PlayEntry>>,
    pub story: Arc<Option<StoryPayload>>,
    pub social_posts: Arc<Vec<SocialPostEntry>>,
    pub odds: Arc<Vec<OddsEntry>>,

    // Loading states
    pub loading: HashSet<DataSlice>,
    /// Slices whose last request completed successfully
    pub loaded: HashSet<DataSlice>,

    // Errors, section-local
    pub errors: HashMap<DataSlice, String>,
}

/// What the rendering layer shows for a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceStatus {
    NotRequested,
    Loading,
    Loaded,
    Failed(String),
}

impl DataState {
    pub fn status(&self, slice: DataSlice) -> SliceStatus {
        if self.loading.contains(&slice) {
            SliceStatus::Loading
        } else if let Some(error) = self.errors.get(&slice) {
            SliceStatus::Failed(error.clone())
        } else if self.loaded.contains(&slice) {
            SliceStatus::Loaded
        } else {
            SliceStatus::NotRequested
        }
    }

    /// A request for the slice completed, successfully or not
    pub fn is_settled(&self, slice: DataSlice) -> bool {
        !self.loading.contains(&slice)
            && (self.loaded.contains(&slice) || self.errors.contains_key(&slice))
    }

    /// The last request for the slice succeeded and no newer one is in flight
    pub fn has_loaded(&self, slice: DataSlice) -> bool {
        !self.loading.contains(&slice) && self.loaded.contains(&slice)
    }

    pub fn begin_loading(&mut self, slice: DataSlice) {
        self.loading.insert(slice);
        self.errors.remove(&slice);
    }

    pub fn finish_loading(&mut self, slice: DataSlice, result: Result<(), String>) {
        self.loading.remove(&slice);
        match result {
            Ok(()) => {
                self.errors.remove(&slice);
                self.loaded.insert(slice);
            }
            Err(message) => {
                self.loaded.remove(&slice);
                self.errors.insert(slice, message);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimelineState {
    pub aggregated: Arc<AggregatedTimeline>,
    pub expansion: PeriodExpansion,
    pub options: AggregateOptions,
}

/// Persisted reading position, as far as this session knows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerState {
    /// Preferences have not answered yet
    #[default]
    NotLoaded,
    Loaded(Option<u32>),
}

impl MarkerState {
    pub fn saved(&self) -> Option<u32> {
        match self {
            MarkerState::NotLoaded => None,
            MarkerState::Loaded(marker) => *marker,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, MarkerState::Loaded(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    pub tracker: ScrollTracker,
    pub resume: ResumePrompt,
    pub marker: MarkerState,
    /// Scroll offset the rendering layer should jump to, cleared by `ScrollConsumed`
    pub pending_scroll: Option<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct SystemState {
    pub config: Config,
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

impl SystemState {
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = false;
    }

    pub fn set_status_error_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = true;
    }
}

/// Everything the rendering layer reads, detached from the reducer's state
#[derive(Debug, Clone)]
pub struct ScreenSnapshot {
    pub availability: Availability,
    pub request: Option<GameRequest>,
    pub game: Arc<Option<GameSummary>>,
    pub story: Arc<Option<StoryPayload>>,
    pub timeline: Arc<AggregatedTimeline>,
    pub default_collapsed_periods: BTreeSet<u32>,
    /// Periods collapsed right now (defaults plus user toggles)
    pub collapsed: BTreeSet<u32>,
    pub current_section: SectionAnchor,
    pub should_prompt_resume: bool,
    pub resume_marker: Option<u32>,
    pub pending_scroll: Option<u16>,
    pub social_opt_in: bool,
    pub slices: BTreeMap<DataSlice, SliceStatus>,
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

impl ScreenSnapshot {
    pub fn groups(&self) -> &[PeriodGroup] {
        &self.timeline.groups
    }

    pub fn ungrouped(&self) -> &[TimelineEvent] {
        &self.timeline.ungrouped
    }

    pub fn slice_status(&self, slice: DataSlice) -> SliceStatus {
        self.slices
            .get(&slice)
            .cloned()
            .unwrap_or(SliceStatus::NotRequested)
    }

    pub fn is_collapsed(&self, period: u32) -> bool {
        self.collapsed.contains(&period)
    }
}
