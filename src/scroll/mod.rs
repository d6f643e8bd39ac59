//! Scroll-sync tracking
//!
//! The rendering layer reports where each section and each play row landed in
//! the scrollable document. The tracker turns those reports into the active
//! navigation tab and decides whether to offer resuming a saved position.
//!
//! All rectangles are in content coordinates: `y` counts rows from the top of
//! the document and the viewport's `y` is the scroll offset.

pub mod resume;
pub mod tracker;

pub use resume::{should_prompt_resume, ResumePrompt, ResumePromptState};
pub use tracker::{current_section, ScrollMsg, ScrollSnapshot, ScrollTracker};

use std::fmt;

/// Fixed set of sections on the game screen, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SectionAnchor {
    #[default]
    Header,
    Overview,
    Timeline,
    PlayerStats,
    TeamStats,
    Final,
}

impl SectionAnchor {
    pub const ALL: [SectionAnchor; 6] = [
        SectionAnchor::Header,
        SectionAnchor::Overview,
        SectionAnchor::Timeline,
        SectionAnchor::PlayerStats,
        SectionAnchor::TeamStats,
        SectionAnchor::Final,
    ];

    /// Sections shown in the navigation tab bar (the header has no tab)
    pub const TABS: [SectionAnchor; 5] = [
        SectionAnchor::Overview,
        SectionAnchor::Timeline,
        SectionAnchor::PlayerStats,
        SectionAnchor::TeamStats,
        SectionAnchor::Final,
    ];

    /// Position in document order
    pub fn order(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionAnchor::Header => "Header",
            SectionAnchor::Overview => "Overview",
            SectionAnchor::Timeline => "Timeline",
            SectionAnchor::PlayerStats => "Player Stats",
            SectionAnchor::TeamStats => "Team Stats",
            SectionAnchor::Final => "Final",
        }
    }

    /// Tab to highlight for this section; the header maps to the first tab
    pub fn tab(self) -> SectionAnchor {
        match self {
            SectionAnchor::Header => SectionAnchor::Overview,
            other => other,
        }
    }
}

impl fmt::Display for SectionAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
