use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::screen::action::Action;
use crate::screen::effects::Effect;
use crate::screen::state::ScreenState;
use crate::scroll::ScrollMsg;
use crate::timeline::aggregate_with;
use crate::types::DataSlice;

/// Handle period expansion actions
///
/// Returns Ok((new_state, effect)) if the action was handled,
/// or Err(state) to pass ownership back to the caller.
pub fn reduce_timeline(
    state: ScreenState,
    action: &Action,
) -> Result<(ScreenState, Effect), ScreenState> {
    match action {
        Action::TogglePeriod(period) => Ok((toggle_period(state, *period), Effect::None)),
        Action::ExpandAllPeriods => {
            let mut new_state = state;
            new_state.timeline.expansion.expand_all();
            Ok((new_state, Effect::None))
        }
        _ => Err(state),
    }
}

fn toggle_period(state: ScreenState, period: u32) -> ScreenState {
    let mut new_state = state;
    let Some(group) = new_state.timeline.aggregated.group(period) else {
        debug!("TIMELINE: Ignoring toggle of unknown period {}", period);
        return new_state;
    };
    let plays: Vec<u32> = group
        .events
        .iter()
        .filter(|e| e.is_play())
        .map(|e| e.sequence_index)
        .collect();

    let collapsed = new_state.timeline.expansion.toggle(period);
    debug!("TIMELINE: Period {} collapsed={}", period, collapsed);
    if collapsed {
        // Collapsed rows are no longer on screen
        new_state.scroll.tracker.apply(ScrollMsg::ForgetPlays(plays));
    }
    new_state
}

/// Re-run the aggregator against whatever slices have arrived
///
/// Called after every plays/posts/odds completion. Defaults are applied once
/// the play-by-play slice has settled, so periods that only exist in the
/// play-by-play are collapsed like the rest.
pub fn rebuild_timeline(state: ScreenState) -> ScreenState {
    let mut new_state = state;
    let no_posts = Vec::new();
    let posts = if new_state.session.social_opt_in {
        new_state.data.social_posts.as_ref()
    } else {
        &no_posts
    };
    let aggregated = aggregate_with(
        &new_state.data.plays,
        posts,
        &new_state.data.odds,
        &new_state.timeline.options,
    );

    // Drop geometry of plays that are gone
    let remaining: HashSet<u32> = aggregated.play_indices().collect();
    let gone: Vec<u32> = new_state
        .scroll
        .tracker
        .play_rects()
        .keys()
        .filter(|index| !remaining.contains(index))
        .copied()
        .collect();
    if !gone.is_empty() {
        new_state.scroll.tracker.apply(ScrollMsg::ForgetPlays(gone));
    }

    new_state.timeline.aggregated = Arc::new(aggregated);

    if new_state.data.is_settled(DataSlice::Timeline)
        && new_state
            .timeline
            .expansion
            .apply_defaults_once(&new_state.timeline.aggregated.groups)
    {
        debug!(
            "TIMELINE: Default collapsed periods {:?}",
            new_state.timeline.expansion.collapsed()
        );
        new_state = reveal_marker_period(new_state);
    }
    new_state
}

/// Keep the period holding the saved reading position expanded
///
/// Only acts while the resume prompt is still undecided; once the user has
/// answered, their own collapse choices stand.
pub fn reveal_marker_period(state: ScreenState) -> ScreenState {
    let mut new_state = state;
    if !new_state.timeline.expansion.is_initialized()
        || !(new_state.scroll.resume.is_pending() || new_state.scroll.resume.is_shown())
    {
        return new_state;
    }
    let Some(marker) = new_state.scroll.marker.saved() else {
        return new_state;
    };
    if !new_state.timeline.aggregated.has_play(marker) {
        return new_state;
    }
    if let Some(period) = new_state.timeline.aggregated.period_of(marker) {
        if new_state.timeline.expansion.is_collapsed(period) {
            debug!("TIMELINE: Expanding period {} to reveal play {}", period, marker);
            new_state.timeline.expansion.expand(period);
        }
    }
    new_state
}
