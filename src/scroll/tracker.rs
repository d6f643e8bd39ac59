use ratatui::layout::Rect;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::layout_constants::DEFAULT_SECTION_OFFSET_BAND;

use super::SectionAnchor;

/// Discrete geometry report from the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollMsg {
    /// Latest rectangle of a section; replaces any earlier report
    SectionRect(SectionAnchor, Rect),
    /// Latest rectangle of a play row, keyed by sequence index
    PlayRect(u32, Rect),
    /// Rows that are no longer rendered (e.g., their period collapsed)
    ForgetPlays(Vec<u32>),
    /// Visible window of the document
    Viewport(Rect),
}

/// Immutable view of the tracker handed to the navigation UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSnapshot {
    pub current_section: SectionAnchor,
    pub viewport: Rect,
    pub topmost_visible_play: Option<u32>,
}

/// Pick the section whose top edge is closest to, but not below, the viewport
/// top plus `offset_band`
///
/// Sections reported with zero height are not rendered and never qualify.
/// When nothing qualifies the previous value is kept, which avoids flicker
/// while sections have not scrolled into the band yet.
pub fn current_section(
    rects: &HashMap<SectionAnchor, Rect>,
    viewport: Rect,
    offset_band: u16,
    previous: SectionAnchor,
) -> SectionAnchor {
    let threshold = viewport.y.saturating_add(offset_band);
    rects
        .iter()
        .filter(|(_, rect)| rect.height > 0 && rect.y <= threshold)
        .max_by_key(|(anchor, rect)| (rect.y, anchor.order()))
        .map(|(anchor, _)| *anchor)
        .unwrap_or(previous)
}

/// Holds the latest rectangle per section and per play row
///
/// No history is kept; every report replaces the previous one for its key.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    section_rects: HashMap<SectionAnchor, Rect>,
    play_rects: HashMap<u32, Rect>,
    viewport: Rect,
    current: SectionAnchor,
    offset_band: u16,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_OFFSET_BAND)
    }
}

impl ScrollTracker {
    pub fn new(offset_band: u16) -> Self {
        Self {
            section_rects: HashMap::new(),
            play_rects: HashMap::new(),
            viewport: Rect::default(),
            current: SectionAnchor::default(),
            offset_band,
        }
    }

    /// Apply one report and recompute the active section
    ///
    /// Returns true if the active section changed.
    pub fn apply(&mut self, msg: ScrollMsg) -> bool {
        trace!("SCROLL: {:?}", msg);
        match msg {
            ScrollMsg::SectionRect(anchor, rect) => {
                self.section_rects.insert(anchor, rect);
            }
            ScrollMsg::PlayRect(sequence_index, rect) => {
                self.play_rects.insert(sequence_index, rect);
            }
            ScrollMsg::ForgetPlays(indices) => {
                for sequence_index in indices {
                    self.play_rects.remove(&sequence_index);
                }
            }
            ScrollMsg::Viewport(rect) => {
                self.viewport = rect;
            }
        }
        self.recompute()
    }

    pub fn update_section_rect(&mut self, anchor: SectionAnchor, rect: Rect) -> bool {
        self.apply(ScrollMsg::SectionRect(anchor, rect))
    }

    pub fn update_play_rect(&mut self, sequence_index: u32, rect: Rect) -> bool {
        self.apply(ScrollMsg::PlayRect(sequence_index, rect))
    }

    pub fn set_viewport(&mut self, viewport: Rect) -> bool {
        self.apply(ScrollMsg::Viewport(viewport))
    }

    fn recompute(&mut self) -> bool {
        let next = current_section(
            &self.section_rects,
            self.viewport,
            self.offset_band,
            self.current,
        );
        if next == self.current {
            return false;
        }
        debug!("SCROLL: Active section {} -> {}", self.current, next);
        self.current = next;
        true
    }

    pub fn current_section(&self) -> SectionAnchor {
        self.current
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn section_rect(&self, anchor: SectionAnchor) -> Option<Rect> {
        self.section_rects.get(&anchor).copied()
    }

    pub fn play_rect(&self, sequence_index: u32) -> Option<Rect> {
        self.play_rects.get(&sequence_index).copied()
    }

    pub fn play_rects(&self) -> &HashMap<u32, Rect> {
        &self.play_rects
    }

    /// Scroll offset that brings a section's top to the viewport top
    pub fn section_target(&self, anchor: SectionAnchor) -> Option<u16> {
        self.section_rect(anchor)
            .filter(|rect| rect.height > 0)
            .map(|rect| rect.y)
    }

    /// Scroll offset that brings a play row to the viewport top
    pub fn play_target(&self, sequence_index: u32) -> Option<u16> {
        self.play_rect(sequence_index).map(|rect| rect.y)
    }

    /// First play row intersecting the viewport; this is the reading position
    pub fn topmost_visible_play(&self) -> Option<u32> {
        let top = self.viewport.y;
        let bottom = self.viewport.y.saturating_add(self.viewport.height);
        self.play_rects
            .iter()
            .filter(|(_, rect)| {
                rect.height > 0 && rect.y < bottom && rect.y.saturating_add(rect.height) > top
            })
            .min_by_key(|(sequence_index, rect)| (rect.y, **sequence_index))
            .map(|(sequence_index, _)| *sequence_index)
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            current_section: self.current,
            viewport: self.viewport,
            topmost_visible_play: self.topmost_visible_play(),
        }
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

    fn document() -> HashMap<SectionAnchor, Rect> {
        HashMap::from([
            (SectionAnchor::Header, rows(0, 6)),
            (SectionAnchor::Overview, rows(6, 20)),
            (SectionAnchor::Timeline, rows(26, 200)),
            (SectionAnchor::PlayerStats, rows(226, 60)),
            (SectionAnchor::TeamStats, rows(286, 20)),
            (SectionAnchor::Final, rows(306, 10)),
        ])
    }

    #[test]
    fn test_current_section_at_top_is_header() {
        let section = current_section(&document(), rows(0, 40), 1, SectionAnchor::Final);
        assert_eq!(section, SectionAnchor::Header);
    }

    #[test]
    fn test_current_section_picks_closest_top_not_below() {
        let section = current_section(&document(), rows(100, 40), 0, SectionAnchor::Header);
        assert_eq!(section, SectionAnchor::Timeline);

        let section = current_section(&document(), rows(226, 40), 0, SectionAnchor::Header);
        assert_eq!(section, SectionAnchor::PlayerStats);
    }

    #[test]
    fn test_offset_band_lets_section_just_below_top_qualify() {
        let without_band = current_section(&document(), rows(24, 40), 0, SectionAnchor::Header);
        assert_eq!(without_band, SectionAnchor::Overview);

        let with_band = current_section(&document(), rows(24, 40), 2, SectionAnchor::Header);
        assert_eq!(with_band, SectionAnchor::Timeline);
    }

    #[test]
    fn test_current_section_sticky_when_nothing_qualifies() {
        let rects = HashMap::from([
            (SectionAnchor::Overview, rows(600, 20)),
            (SectionAnchor::Timeline, rows(700, 200)),
            (SectionAnchor::Final, rows(950, 10)),
        ]);
        let section = current_section(&rects, rows(500, 40), 1, SectionAnchor::Timeline);
        assert_eq!(section, SectionAnchor::Timeline);
    }

    #[test]
    fn test_sticky_boundary_follows_offset_band() {
        let band = DEFAULT_SECTION_OFFSET_BAND;
        let within = HashMap::from([(SectionAnchor::Final, rows(500 + band, 10))]);
        assert_eq!(
            current_section(&within, rows(500, 40), band, SectionAnchor::Timeline),
            SectionAnchor::Final
        );

        let beyond = HashMap::from([(SectionAnchor::Final, rows(500 + band + 1, 10))]);
        assert_eq!(
            current_section(&beyond, rows(500, 40), band, SectionAnchor::Timeline),
            SectionAnchor::Timeline
        );

        // Without a band any section below the top leaves the previous one active
        let below = HashMap::from([(SectionAnchor::Final, rows(501, 10))]);
        assert_eq!(
            current_section(&below, rows(500, 40), 0, SectionAnchor::Timeline),
            SectionAnchor::Timeline
        );
    }

    #[test]
    fn test_current_section_no_rects_keeps_previous() {
        let section = current_section(&HashMap::new(), rows(0, 40), 1, SectionAnchor::TeamStats);
        assert_eq!(section, SectionAnchor::TeamStats);
    }

    #[test]
    fn test_zero_height_sections_are_ignored() {
        let mut rects = document();
        rects.insert(SectionAnchor::PlayerStats, rows(226, 0));
        let section = current_section(&rects, rows(230, 40), 0, SectionAnchor::Header);
        assert_eq!(section, SectionAnchor::Timeline);
    }

    #[test]
    fn test_tracker_last_report_wins() {
        let mut tracker = ScrollTracker::new(0);
        tracker.update_section_rect(SectionAnchor::Overview, rows(50, 10));
        tracker.update_section_rect(SectionAnchor::Overview, rows(5, 10));
        assert_eq!(tracker.section_rect(SectionAnchor::Overview), Some(rows(5, 10)));
    }

    #[test]
    fn test_tracker_recomputes_on_viewport_change() {
        let mut tracker = ScrollTracker::new(0);
        for (anchor, rect) in document() {
            tracker.update_section_rect(anchor, rect);
        }
        assert_eq!(tracker.current_section(), SectionAnchor::Header);

        assert!(tracker.set_viewport(rows(290, 40)));
        assert_eq!(tracker.current_section(), SectionAnchor::TeamStats);

        assert!(!tracker.set_viewport(rows(291, 40)));
    }

    #[test]
    fn test_tracker_recomputes_on_section_update() {
        let mut tracker = ScrollTracker::new(0);
        tracker.set_viewport(rows(100, 40));
        tracker.update_section_rect(SectionAnchor::Overview, rows(10, 20));
        assert_eq!(tracker.current_section(), SectionAnchor::Overview);

        // Content above grew and pushed the timeline into view
        assert!(tracker.update_section_rect(SectionAnchor::Timeline, rows(90, 200)));
        assert_eq!(tracker.current_section(), SectionAnchor::Timeline);
    }

    #[test]
    fn test_topmost_visible_play() {
        let mut tracker = ScrollTracker::default();
        tracker.update_play_rect(0, rows(30, 2));
        tracker.update_play_rect(1, rows(32, 2));
        tracker.update_play_rect(2, rows(34, 2));
        tracker.set_viewport(rows(33, 20));

        assert_eq!(tracker.topmost_visible_play(), Some(1));
        assert_eq!(tracker.snapshot().topmost_visible_play, Some(1));
    }

    #[test]
    fn test_forget_plays_removes_rects() {
        let mut tracker = ScrollTracker::default();
        tracker.update_play_rect(4, rows(30, 2));
        tracker.update_play_rect(5, rows(32, 2));
        tracker.apply(ScrollMsg::ForgetPlays(vec![4]));
        assert_eq!(tracker.play_rect(4), None);
        assert_eq!(tracker.play_target(5), Some(32));
    }

    #[test]
    fn test_section_target_requires_rendered_section() {
        let mut tracker = ScrollTracker::default();
        tracker.update_section_rect(SectionAnchor::TeamStats, rows(286, 0));
        tracker.update_section_rect(SectionAnchor::Final, rows(306, 10));
        assert_eq!(tracker.section_target(SectionAnchor::TeamStats), None);
        assert_eq!(tracker.section_target(SectionAnchor::Final), Some(306));
        assert_eq!(tracker.section_target(SectionAnchor::Overview), None);
    }
}
