//! Shared layout constants used by the scroll tracker and the CLI printer.
//!
//! Geometry is measured in rows of the scrollable game document.

/// Rows below the viewport top that still count as "at the top" when picking
/// the active section
///
/// The active section stays unchanged only while every section starts more
/// than this many rows below the viewport top; with a band of 1 a section at
/// `viewport.y + 1` already becomes active.
pub const DEFAULT_SECTION_OFFSET_BAND: u16 = 1;

/// A saved reading position closer than this to the viewport top is treated
/// as already in place, so no resume prompt is offered
pub const DEFAULT_RESUME_TOLERANCE: u16 = 2;

/// Width of the period label column (e.g., "P1", "2OT")
pub const PERIOD_COL_WIDTH: usize = 4;

/// Width of the game clock column
pub const CLOCK_COL_WIDTH: usize = 6;

/// Width of the team abbreviation column
pub const TEAM_ABBREV_COL_WIDTH: usize = 5;

/// Width of the score column ("102-99")
pub const SCORE_COL_WIDTH: usize = 8;

/// Width of social handle column
pub const HANDLE_COL_WIDTH: usize = 18;
