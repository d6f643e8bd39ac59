use tracing::debug;

use crate::screen::action::Action;
use crate::screen::effects::Effect;
use crate::screen::state::{MarkerState, ScreenState};
use crate::scroll::{ScrollMsg, SectionAnchor};
use crate::types::DataSlice;

/// Handle geometry reports, section navigation and the resume prompt
///
/// Returns Ok((new_state, effect)) if the action was handled,
/// or Err(state) to pass ownership back to the caller.
pub fn reduce_scroll(
    state: ScreenState,
    action: &Action,
) -> Result<(ScreenState, Effect), ScreenState> {
    match action {
        Action::Scroll(msg) => Ok(handle_scroll_msg(state, msg.clone())),
        Action::ScrollConsumed => {
            let mut new_state = state;
            new_state.scroll.pending_scroll = None;
            Ok((new_state, Effect::None))
        }
        Action::SelectSection(anchor) => Ok((select_section(state, *anchor), Effect::None)),
        Action::ResumeReading => Ok((resume_reading(state), Effect::None)),
        Action::StartOver => Ok(start_over(state)),
        _ => Err(state),
    }
}

fn handle_scroll_msg(state: ScreenState, msg: ScrollMsg) -> (ScreenState, Effect) {
    let mut new_state = state;
    let viewport_moved = matches!(msg, ScrollMsg::Viewport(_));
    new_state.scroll.tracker.apply(msg);

    let new_state = evaluate_resume(new_state);
    if viewport_moved {
        save_reading_position(new_state)
    } else {
        (new_state, Effect::None)
    }
}

/// Settle the resume prompt once the marker and its row geometry are known
///
/// A marker that names no play of a loaded play-by-play is rejected rather
/// than left waiting for a row that will never be reported. A failed
/// play-by-play leaves the prompt pending so a retry can still offer it.
pub fn evaluate_resume(state: ScreenState) -> ScreenState {
    let mut new_state = state;
    if !new_state.scroll.resume.is_pending() {
        return new_state;
    }
    let MarkerState::Loaded(marker) = new_state.scroll.marker else {
        return new_state;
    };

    if let Some(index) = marker {
        if !new_state.timeline.aggregated.has_play(index) {
            if new_state.data.has_loaded(DataSlice::Timeline) {
                new_state.scroll.resume.reject_marker();
            }
            return new_state;
        }
    }

    let play_rects = new_state.scroll.tracker.play_rects().clone();
    let viewport = new_state.scroll.tracker.viewport();
    new_state
        .scroll
        .resume
        .should_prompt_resume(marker, &play_rects, viewport);
    new_state
}

/// Persist the topmost visible play as the reading position
///
/// Nothing is written while the resume prompt is still undecided or showing,
/// so the saved marker survives until the user answers.
fn save_reading_position(state: ScreenState) -> (ScreenState, Effect) {
    let mut new_state = state;
    let (Some(request), MarkerState::Loaded(saved)) =
        (new_state.session.request, new_state.scroll.marker)
    else {
        return (new_state, Effect::None);
    };
    if new_state.scroll.resume.is_pending() || new_state.scroll.resume.is_shown() {
        return (new_state, Effect::None);
    }
    let Some(topmost) = new_state.scroll.tracker.topmost_visible_play() else {
        return (new_state, Effect::None);
    };
    if saved == Some(topmost) {
        return (new_state, Effect::None);
    }

    debug!("SCROLL: Reading position now play {}", topmost);
    new_state.scroll.marker = MarkerState::Loaded(Some(topmost));
    (new_state, Effect::SaveResumeMarker(request.id, topmost))
}

fn select_section(state: ScreenState, anchor: SectionAnchor) -> ScreenState {
    let mut new_state = state;
    match new_state.scroll.tracker.section_target(anchor) {
        Some(offset) => {
            debug!("SCROLL: Jump to {} at row {}", anchor, offset);
            new_state.scroll.pending_scroll = Some(offset);
        }
        None => debug!("SCROLL: Section {} is not rendered; ignoring", anchor),
    }
    new_state
}

fn resume_reading(state: ScreenState) -> ScreenState {
    let mut new_state = state;
    let was_shown = new_state.scroll.resume.resume();
    let target = new_state
        .scroll
        .marker
        .saved()
        .and_then(|marker| new_state.scroll.tracker.play_target(marker));
    debug!(
        "SCROLL: Resume reading (prompt shown={}, target={:?})",
        was_shown, target
    );
    if target.is_some() {
        new_state.scroll.pending_scroll = target;
    }
    new_state
}

fn start_over(state: ScreenState) -> (ScreenState, Effect) {
    let mut new_state = state;
    let was_shown = new_state.scroll.resume.start_over();
    debug!("SCROLL: Start over (prompt shown={})", was_shown);
    new_state.scroll.pending_scroll = Some(0);

    let had_marker = new_state.scroll.marker.saved().is_some();
    new_state.scroll.marker = MarkerState::Loaded(None);
    match new_state.session.request {
        Some(request) if had_marker => (new_state, Effect::ClearResumeMarker(request.id)),
        _ => (new_state, Effect::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::testing::{hockey_state, rows};
    use crate::fixtures;
    use crate::screen::reducer::reduce;
    use crate::scroll::ResumePromptState;
    use crate::types::League;

    fn with_marker(marker: Option<u32>) -> ScreenState {
        let mut state = hockey_state();
        state.scroll.marker = MarkerState::Loaded(marker);
        state
    }

    fn scroll(state: ScreenState, msg: ScrollMsg) -> (ScreenState, Effect) {
        reduce_scroll(state, &Action::Scroll(msg)).unwrap()
    }

    #[test]
    fn test_prompt_waits_for_marker_row() {
        let state = evaluate_resume(with_marker(Some(7)));
        assert!(state.scroll.resume.is_pending());

        let (state, _) = scroll(state, ScrollMsg::PlayRect(7, rows(900, 2)));
        assert!(state.scroll.resume.is_shown());
        assert!(state.snapshot().should_prompt_resume);
    }

    #[test]
    fn test_marker_near_viewport_does_not_prompt() {
        let (state, _) = scroll(with_marker(Some(0)), ScrollMsg::PlayRect(0, rows(1, 2)));
        assert_eq!(
            state.scroll.resume.state(),
            ResumePromptState::Evaluated { shown: false }
        );
    }

    #[test]
    fn test_marker_of_non_play_is_rejected() {
        // Index 6 is the unclassifiable feed row
        let state = evaluate_resume(with_marker(Some(6)));
        assert_eq!(
            state.scroll.resume.state(),
            ResumePromptState::Evaluated { shown: false }
        );
    }

    #[test]
    fn test_marker_waits_while_play_by_play_loading() {
        let mut state = with_marker(Some(40));
        state.data.begin_loading(DataSlice::Timeline);
        let state = evaluate_resume(state);
        assert!(state.scroll.resume.is_pending());
    }

    #[test]
    fn test_failed_play_by_play_keeps_prompt_for_retry() {
        let state = evaluate_resume(with_marker(Some(7)));
        let request = state.session.request.unwrap();

        let (state, _) = reduce(
            state,
            Action::TimelineLoaded(request.id, Err("Failed to load play-by-play: timeout".to_string())),
        );
        assert!(state.scroll.resume.is_pending());

        // Scrolling over the error state must not overwrite the saved marker
        let (state, effect) = scroll(state, ScrollMsg::Viewport(rows(0, 40)));
        assert!(matches!(effect, Effect::None));
        assert_eq!(state.scroll.marker.saved(), Some(7));

        let (state, effect) = reduce(state, Action::RetrySlice(DataSlice::Timeline));
        assert!(matches!(effect, Effect::Refetch(_, DataSlice::Timeline)));
        let (state, _) = reduce(
            state,
            Action::TimelineLoaded(request.id, Ok(fixtures::create_mock_plays(League::Nhl))),
        );
        assert!(state.scroll.resume.is_pending());

        let (state, _) = scroll(state, ScrollMsg::PlayRect(7, rows(900, 2)));
        let (state, effect) = scroll(state, ScrollMsg::Viewport(rows(0, 40)));
        assert!(state.snapshot().should_prompt_resume);
        assert!(matches!(effect, Effect::None));
        assert_eq!(state.scroll.marker.saved(), Some(7));
    }

    #[test]
    fn test_no_save_while_prompt_pending_or_shown() {
        let (state, effect) = scroll(with_marker(Some(7)), ScrollMsg::PlayRect(0, rows(0, 2)));
        assert!(matches!(effect, Effect::None));

        let (state, _) = scroll(state, ScrollMsg::PlayRect(7, rows(900, 2)));
        let (state, effect) = scroll(state, ScrollMsg::Viewport(rows(0, 40)));
        assert!(state.scroll.resume.is_shown());
        assert!(matches!(effect, Effect::None));
        assert_eq!(state.scroll.marker.saved(), Some(7));
    }

    #[test]
    fn test_viewport_move_saves_topmost_play() {
        let state = with_marker(None);
        let (state, _) = scroll(state, ScrollMsg::PlayRect(0, rows(10, 2)));
        let (state, _) = scroll(state, ScrollMsg::PlayRect(1, rows(12, 2)));
        let (state, effect) = scroll(state, ScrollMsg::Viewport(rows(11, 30)));

        assert!(matches!(effect, Effect::SaveResumeMarker(_, 0)));
        assert_eq!(state.scroll.marker.saved(), Some(0));

        let (state, effect) = scroll(state, ScrollMsg::Viewport(rows(12, 30)));
        assert!(matches!(effect, Effect::SaveResumeMarker(_, 1)));

        // Same topmost play, nothing to write
        let (_, effect) = scroll(state, ScrollMsg::Viewport(rows(13, 30)));
        assert!(matches!(effect, Effect::None));
    }

    #[test]
    fn test_resume_scrolls_to_marker_and_latches() {
        let (state, _) = scroll(with_marker(Some(7)), ScrollMsg::PlayRect(7, rows(900, 2)));
        let (state, effect) = reduce_scroll(state, &Action::ResumeReading).unwrap();

        assert_eq!(state.scroll.pending_scroll, Some(900));
        assert_eq!(state.scroll.resume.state(), ResumePromptState::Dismissed);
        assert!(matches!(effect, Effect::None));

        let (state, _) = scroll(state, ScrollMsg::PlayRect(7, rows(900, 2)));
        assert!(!state.snapshot().should_prompt_resume);
    }

    #[test]
    fn test_start_over_clears_marker_and_scrolls_top() {
        let (state, _) = scroll(with_marker(Some(7)), ScrollMsg::PlayRect(7, rows(900, 2)));
        let (state, effect) = reduce_scroll(state, &Action::StartOver).unwrap();

        assert_eq!(state.scroll.pending_scroll, Some(0));
        assert_eq!(state.scroll.marker, MarkerState::Loaded(None));
        assert!(matches!(effect, Effect::ClearResumeMarker(_)));

        // Same qualifying rect reported again: still latched off
        let (state, _) = scroll(state, ScrollMsg::PlayRect(7, rows(900, 2)));
        assert!(!state.scroll.resume.is_shown());
    }

    #[test]
    fn test_select_section_sets_pending_scroll() {
        let state = hockey_state();
        let (state, _) = scroll(state, ScrollMsg::SectionRect(SectionAnchor::TeamStats, rows(286, 20)));
        let (state, _) = reduce_scroll(state, &Action::SelectSection(SectionAnchor::TeamStats)).unwrap();
        assert_eq!(state.scroll.pending_scroll, Some(286));

        let (state, _) = reduce_scroll(state, &Action::ScrollConsumed).unwrap();
        assert_eq!(state.scroll.pending_scroll, None);

        let (state, _) = reduce_scroll(state, &Action::SelectSection(SectionAnchor::Final)).unwrap();
        assert_eq!(state.scroll.pending_scroll, None);
    }

    #[test]
    fn test_current_section_follows_viewport() {
        let state = hockey_state();
        let (state, _) = scroll(state, ScrollMsg::SectionRect(SectionAnchor::Overview, rows(6, 20)));
        let (state, _) = scroll(state, ScrollMsg::SectionRect(SectionAnchor::Timeline, rows(26, 200)));
        let (state, _) = scroll(state, ScrollMsg::Viewport(rows(100, 40)));
        assert_eq!(state.snapshot().current_section, SectionAnchor::Timeline);

        // Nothing qualifies above the top: sticky
        let (state, _) = scroll(state, ScrollMsg::Viewport(rows(0, 40)));
        assert_eq!(state.snapshot().current_section, SectionAnchor::Timeline);
    }
}
