use chrono::{DateTime, Local, Utc};
use std::fmt::Write;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::layout_constants::{
    CLOCK_COL_WIDTH, HANDLE_COL_WIDTH, PERIOD_COL_WIDTH, SCORE_COL_WIDTH, TEAM_ABBREV_COL_WIDTH,
};
use crate::timeline::{EventPayload, PeriodGroup, TimelineEvent};
use crate::types::{GameStatus, GameSummary, League};

/// Characters used for separators and period markers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxChars {
    pub horizontal: String,
    pub double_horizontal: String,
    pub expanded: String,
    pub collapsed: String,
    pub media: String,
}

impl BoxChars {
    pub fn unicode() -> Self {
        Self {
            horizontal: "─".to_string(),
            double_horizontal: "═".to_string(),
            expanded: "▾".to_string(),
            collapsed: "▸".to_string(),
            media: "▶".to_string(),
        }
    }

    pub fn ascii() -> Self {
        Self {
            horizontal: "-".to_string(),
            double_horizontal: "=".to_string(),
            expanded: "v".to_string(),
            collapsed: ">".to_string(),
            media: "[media]".to_string(),
        }
    }

    pub fn from_use_unicode(use_unicode: bool) -> Self {
        if use_unicode {
            Self::unicode()
        } else {
            Self::ascii()
        }
    }
}

/// Format a header with text and an underline as wide as the text
///
/// # Arguments
/// * `text` - The header text to display
/// * `double_line` - If true, uses double-line (═/=), otherwise single-line (─/-)
/// * `box_chars` - Character set to draw with
pub fn format_header(text: &str, double_line: bool, box_chars: &BoxChars) -> String {
    let separator_char = if double_line {
        &box_chars.double_horizontal
    } else {
        &box_chars.horizontal
    };
    format!("{}\n{}\n", text, separator_char.repeat(text.width()))
}

/// Pad or cut `text` to exactly `width` terminal columns
///
/// Wide characters are never split; a cut that lands inside one is padded.
pub fn pad_display(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

/// "BOS 2 @ TOR 3  Final"
pub fn format_game_line(game: &GameSummary) -> String {
    let score = |s: Option<u32>| s.map(|s| format!(" {}", s)).unwrap_or_default();
    let status = match &game.status {
        GameStatus::Scheduled => "Scheduled".to_string(),
        GameStatus::Live { period, clock } => {
            let label = game.league.period_label(*period, game.playoffs);
            match clock {
                Some(clock) => format!("{} {}", label, clock),
                None => label,
            }
        }
        GameStatus::Final => "Final".to_string(),
        GameStatus::Postponed => "Postponed".to_string(),
    };
    format!(
        "{}{} @ {}{}  {}",
        game.away.abbrev,
        score(game.away.score),
        game.home.abbrev,
        score(game.home.score),
        status
    )
}

/// Period card header: marker, label, play count and the score at its end
pub fn format_period_header(
    group: &PeriodGroup,
    league: League,
    playoffs: bool,
    collapsed: bool,
    box_chars: &BoxChars,
) -> String {
    let marker = if collapsed {
        &box_chars.collapsed
    } else {
        &box_chars.expanded
    };
    let plays = match group.play_count() {
        1 => "1 play".to_string(),
        n => format!("{} plays", n),
    };
    let mut line = format!(
        "{} {} {}",
        marker,
        pad_display(&league.period_label(group.period, playoffs), PERIOD_COL_WIDTH),
        plays
    );
    if let Some((home, away)) = group.closing_score() {
        line.push_str(&format!("  {}", format_score(home, away)));
    }
    line
}

/// Away-first score, the way the game line reads
pub fn format_score(home: u32, away: u32) -> String {
    format!("{}-{}", away, home)
}

/// Wall-clock time of an event; blank when missing or `time_format` is unusable
fn format_time(timestamp: Option<DateTime<Utc>>, time_format: &str) -> String {
    let Some(timestamp) = timestamp else {
        return String::new();
    };
    let mut out = String::new();
    if write!(out, "{}", timestamp.with_timezone(&Local).format(time_format)).is_err() {
        return String::new();
    }
    out
}

/// One timeline row
///
/// Plays show their game clock, posts and odds their wall-clock time.
pub fn format_event_row(event: &TimelineEvent, time_format: &str, box_chars: &BoxChars) -> String {
    match &event.payload {
        EventPayload::Play {
            description, team, ..
        } => {
            let clock = event.game_clock.clone().unwrap_or_default();
            let score = event
                .score()
                .map(|(home, away)| format_score(home, away))
                .unwrap_or_default();
            format!(
                "{} {} {} {}",
                pad_display(&clock, CLOCK_COL_WIDTH),
                pad_display(team.as_deref().unwrap_or(""), TEAM_ABBREV_COL_WIDTH),
                pad_display(&score, SCORE_COL_WIDTH),
                description
            )
            .trim_end()
            .to_string()
        }
        EventPayload::SocialPost {
            handle,
            text,
            media_url,
        } => {
            let mut body = text.clone().unwrap_or_default();
            if media_url.is_some() {
                if !body.is_empty() {
                    body.push(' ');
                }
                body.push_str(&box_chars.media);
            }
            format!(
                "{} {} {}",
                pad_display(&format_time(event.timestamp, time_format), CLOCK_COL_WIDTH),
                pad_display(handle.as_deref().unwrap_or(""), HANDLE_COL_WIDTH),
                body
            )
        }
        EventPayload::Odds { market, line } => format!(
            "{} {} {}",
            pad_display(&format_time(event.timestamp, time_format), CLOCK_COL_WIDTH),
            pad_display(market.as_deref().unwrap_or("odds"), HANDLE_COL_WIDTH),
            line
        ),
        EventPayload::Unknown => format!(
            "{} (unavailable)",
            pad_display(event.game_clock.as_deref().unwrap_or(""), CLOCK_COL_WIDTH)
        ),
    }
}
