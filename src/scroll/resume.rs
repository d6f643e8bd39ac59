use ratatui::layout::Rect;
use std::collections::HashMap;
use tracing::debug;

use crate::layout_constants::DEFAULT_RESUME_TOLERANCE;

/// Geometry test behind the resume prompt
///
/// True when a marker exists, its play row has been laid out, and the row sits
/// more than `tolerance` rows away from the viewport top.
pub fn should_prompt_resume(
    saved_index: Option<u32>,
    play_rects: &HashMap<u32, Rect>,
    viewport: Rect,
    tolerance: u16,
) -> bool {
    let Some(sequence_index) = saved_index else {
        return false;
    };
    let Some(rect) = play_rects.get(&sequence_index) else {
        return false;
    };
    rect.y.abs_diff(viewport.y) > tolerance
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumePromptState {
    /// Waiting for the marker and its row geometry
    #[default]
    Unchecked,
    Evaluated { shown: bool },
    /// The user resumed or started over; terminal for the session
    Dismissed,
}

/// One-shot latch around `should_prompt_resume`
///
/// Once evaluated the answer is not re-derived from geometry, and once the
/// user acts the prompt never comes back within the session.
#[derive(Debug, Clone)]
pub struct ResumePrompt {
    state: ResumePromptState,
    tolerance: u16,
}

impl Default for ResumePrompt {
    fn default() -> Self {
        Self::new(DEFAULT_RESUME_TOLERANCE)
    }
}

impl ResumePrompt {
    pub fn new(tolerance: u16) -> Self {
        Self {
            state: ResumePromptState::Unchecked,
            tolerance,
        }
    }

    pub fn state(&self) -> ResumePromptState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ResumePromptState::Unchecked
    }

    pub fn is_shown(&self) -> bool {
        self.state == ResumePromptState::Evaluated { shown: true }
    }

    /// Evaluate the prompt against the latest geometry
    ///
    /// A missing marker settles the prompt as not shown. A marker whose row
    /// has not been laid out yet leaves the prompt unchecked.
    pub fn should_prompt_resume(
        &mut self,
        saved_index: Option<u32>,
        play_rects: &HashMap<u32, Rect>,
        viewport: Rect,
    ) -> bool {
        match self.state {
            ResumePromptState::Dismissed => false,
            ResumePromptState::Evaluated { shown } => shown,
            ResumePromptState::Unchecked => {
                let Some(sequence_index) = saved_index else {
                    self.state = ResumePromptState::Evaluated { shown: false };
                    return false;
                };
                if !play_rects.contains_key(&sequence_index) {
                    return false;
                }
                let shown = should_prompt_resume(saved_index, play_rects, viewport, self.tolerance);
                debug!(
                    "SCROLL: Resume prompt for play {} evaluated (shown={})",
                    sequence_index, shown
                );
                self.state = ResumePromptState::Evaluated { shown };
                shown
            }
        }
    }

    /// Settle an unchecked prompt when the marker names no play of the timeline
    pub fn reject_marker(&mut self) {
        if self.state == ResumePromptState::Unchecked {
            debug!("SCROLL: Saved marker does not match any play; no resume prompt");
            self.state = ResumePromptState::Evaluated { shown: false };
        }
    }

    /// User chose to jump back to the saved position
    ///
    /// Returns true if the prompt was showing.
    pub fn resume(&mut self) -> bool {
        self.dismiss()
    }

    /// User chose to read from the top
    ///
    /// Returns true if the prompt was showing.
    pub fn start_over(&mut self) -> bool {
        self.dismiss()
    }

    fn dismiss(&mut self) -> bool {
        let was_shown = self.is_shown();
        self.state = ResumePromptState::Dismissed;
        was_shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(y: u16, height: u16) -> Rect {
        Rect {
            x: 0,
            y,
            width: 80,
            height,
        }
    }

    #[test]
    fn test_prompt_when_marker_far_from_viewport() {
        let play_rects = HashMap::from([(5, rows(900, 2))]);
        assert!(should_prompt_resume(Some(5), &play_rects, rows(0, 800), 2));
    }

    #[test]
    fn test_no_prompt_within_tolerance() {
        let play_rects = HashMap::from([(5, rows(101, 2))]);
        assert!(!should_prompt_resume(Some(5), &play_rects, rows(100, 40), 2));
    }

    #[test]
    fn test_no_prompt_without_marker_or_rect() {
        let play_rects = HashMap::from([(5, rows(900, 2))]);
        assert!(!should_prompt_resume(None, &play_rects, rows(0, 800), 2));
        assert!(!should_prompt_resume(Some(6), &play_rects, rows(0, 800), 2));
    }

    #[test]
    fn test_latch_false_after_resume() {
        let play_rects = HashMap::from([(5, rows(900, 2))]);
        let viewport = rows(0, 800);
        let mut prompt = ResumePrompt::new(2);

        assert!(prompt.should_prompt_resume(Some(5), &play_rects, viewport));
        assert!(prompt.resume());
        assert!(!prompt.should_prompt_resume(Some(5), &play_rects, viewport));
        assert_eq!(prompt.state(), ResumePromptState::Dismissed);
    }

    #[test]
    fn test_latch_false_after_start_over_even_if_rect_reappears() {
        let mut play_rects = HashMap::from([(5, rows(900, 2))]);
        let viewport = rows(0, 800);
        let mut prompt = ResumePrompt::new(2);

        assert!(prompt.should_prompt_resume(Some(5), &play_rects, viewport));
        prompt.start_over();

        play_rects.remove(&5);
        play_rects.insert(5, rows(900, 2));
        assert!(!prompt.should_prompt_resume(Some(5), &play_rects, viewport));
    }

    #[test]
    fn test_missing_marker_settles_not_shown() {
        let mut prompt = ResumePrompt::default();
        assert!(!prompt.should_prompt_resume(None, &HashMap::new(), rows(0, 40)));
        assert_eq!(prompt.state(), ResumePromptState::Evaluated { shown: false });

        // A marker showing up later does not reopen the question
        let play_rects = HashMap::from([(5, rows(900, 2))]);
        assert!(!prompt.should_prompt_resume(Some(5), &play_rects, rows(0, 40)));
    }

    #[test]
    fn test_unreported_row_stays_unchecked() {
        let mut prompt = ResumePrompt::default();
        assert!(!prompt.should_prompt_resume(Some(5), &HashMap::new(), rows(0, 40)));
        assert!(prompt.is_pending());

        let play_rects = HashMap::from([(5, rows(900, 2))]);
        assert!(prompt.should_prompt_resume(Some(5), &play_rects, rows(0, 40)));
        assert!(prompt.is_shown());
    }

    #[test]
    fn test_evaluated_answer_is_not_rederived() {
        let mut prompt = ResumePrompt::default();
        let near = HashMap::from([(5, rows(1, 2))]);
        assert!(!prompt.should_prompt_resume(Some(5), &near, rows(0, 40)));

        let far = HashMap::from([(5, rows(900, 2))]);
        assert!(!prompt.should_prompt_resume(Some(5), &far, rows(0, 40)));
    }

    #[test]
    fn test_reject_marker() {
        let mut prompt = ResumePrompt::default();
        prompt.reject_marker();
        assert_eq!(prompt.state(), ResumePromptState::Evaluated { shown: false });
    }
}
