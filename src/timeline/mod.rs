//! Unified game timeline
//!
//! Merges play-by-play, social posts and odds updates into one ordered
//! sequence grouped by period.

pub mod aggregate;
pub mod classify;
pub mod expansion;

pub use aggregate::{aggregate, aggregate_with, default_collapsed_periods, AggregateOptions};
pub use expansion::PeriodExpansion;

use chrono::{DateTime, Utc};

/// Normalized kind of a timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Play,
    SocialPost,
    OddsUpdate,
    Unknown,
}

/// Which input stream an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Plays,
    SocialPosts,
    Odds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Play {
        play_type: Option<String>,
        description: String,
        team: Option<String>,
        player: Option<String>,
    },
    SocialPost {
        handle: Option<String>,
        text: Option<String>,
        media_url: Option<String>,
    },
    Odds {
        market: Option<String>,
        line: String,
    },
    /// Entry that could not be classified; kept for display
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub sequence_index: u32,
    pub source: EventSource,
    pub period: Option<u32>,
    /// Display-only ordering hint
    pub timestamp: Option<DateTime<Utc>>,
    /// Display-only ordering hint
    pub game_clock: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub payload: EventPayload,
}

impl TimelineEvent {
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Play { .. } => EventKind::Play,
            EventPayload::SocialPost { .. } => EventKind::SocialPost,
            EventPayload::Odds { .. } => EventKind::OddsUpdate,
            EventPayload::Unknown => EventKind::Unknown,
        }
    }

    pub fn is_play(&self) -> bool {
        self.kind() == EventKind::Play
    }

    /// Scoring plays carry both scores
    pub fn score(&self) -> Option<(u32, u32)> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// Events sharing one period, ordered by ascending sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodGroup {
    pub period: u32,
    pub events: Vec<TimelineEvent>,
}

impl PeriodGroup {
    pub fn play_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_play()).count()
    }

    /// Last (home, away) score recorded in this period
    pub fn closing_score(&self) -> Option<(u32, u32)> {
        self.events.iter().rev().find_map(TimelineEvent::score)
    }

    pub fn contains(&self, sequence_index: u32) -> bool {
        self.events
            .binary_search_by_key(&sequence_index, |e| e.sequence_index)
            .is_ok()
    }
}

/// Where an ungrouped post falls relative to the timestamped plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UngroupedPlacement {
    /// Before the first play, or no time to place it by
    Pregame,
    /// Between the first and last play, without a period
    InGame,
    /// After the last play
    Postgame,
}

/// Output of the aggregator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedTimeline {
    /// Period groups in strictly ascending period order
    pub groups: Vec<PeriodGroup>,
    /// Social posts without a period (pre/post-game), in sequence order
    pub ungrouped: Vec<TimelineEvent>,
    /// Unperiodized entries that were neither posts nor displayable
    pub dropped: usize,
}

impl AggregatedTimeline {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.ungrouped.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.groups.iter().map(|g| g.events.len()).sum::<usize>() + self.ungrouped.len()
    }

    pub fn group(&self, period: u32) -> Option<&PeriodGroup> {
        self.groups
            .binary_search_by_key(&period, |g| g.period)
            .ok()
            .map(|idx| &self.groups[idx])
    }

    pub fn periods(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.iter().map(|g| g.period)
    }

    /// Period holding the event with this sequence index
    pub fn period_of(&self, sequence_index: u32) -> Option<u32> {
        self.groups
            .iter()
            .find(|g| g.contains(sequence_index))
            .map(|g| g.period)
    }

    /// Sequence indices of every grouped play
    pub fn play_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.events.iter())
            .filter(|e| e.is_play())
            .map(|e| e.sequence_index)
    }

    /// Earliest and latest wall-clock time among grouped plays
    pub fn play_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut times = self
            .groups
            .iter()
            .flat_map(|g| g.events.iter())
            .filter(|e| e.is_play())
            .filter_map(|e| e.timestamp);
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Ungrouped posts at one placement, in sequence order
    pub fn ungrouped_at(&self, placement: UngroupedPlacement) -> Vec<&TimelineEvent> {
        let span = self.play_span();
        self.ungrouped
            .iter()
            .filter(|e| Self::placement_in(span, e) == placement)
            .collect()
    }

    fn placement_in(
        span: Option<(DateTime<Utc>, DateTime<Utc>)>,
        event: &TimelineEvent,
    ) -> UngroupedPlacement {
        match (span, event.timestamp) {
            (Some((_, last)), Some(t)) if t > last => UngroupedPlacement::Postgame,
            (Some((first, _)), Some(t)) if t >= first => UngroupedPlacement::InGame,
            _ => UngroupedPlacement::Pregame,
        }
    }

    pub fn has_play(&self, sequence_index: u32) -> bool {
        self.groups.iter().any(|g| {
            g.events
                .iter()
                .any(|e| e.sequence_index == sequence_index && e.is_play())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::types::League;

    fn handles(events: Vec<&TimelineEvent>) -> Vec<String> {
        events
            .into_iter()
            .filter_map(|e| match &e.payload {
                EventPayload::SocialPost { handle, .. } => handle.clone(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ungrouped_posts_split_around_plays() {
        let timeline = aggregate(
            &fixtures::create_mock_plays(League::Nhl),
            &fixtures::create_mock_social_posts(League::Nhl),
            &[],
        );
        assert_eq!(timeline.ungrouped.len(), 3);
        assert_eq!(handles(timeline.ungrouped_at(UngroupedPlacement::Pregame)), vec!["@MapleLeafs"]);
        assert_eq!(handles(timeline.ungrouped_at(UngroupedPlacement::InGame)), vec!["@SportsnetTO"]);
        let postgame = timeline.ungrouped_at(UngroupedPlacement::Postgame);
        assert_eq!(postgame.len(), 1);
        assert!(matches!(
            &postgame[0].payload,
            EventPayload::SocialPost { text: Some(text), .. } if text.starts_with("MITCH IN OT")
        ));
    }

    #[test]
    fn test_ungrouped_posts_without_plays_are_pregame() {
        let timeline = aggregate(&[], &fixtures::create_mock_social_posts(League::Nhl), &[]);
        assert_eq!(timeline.play_span(), None);
        assert_eq!(timeline.ungrouped_at(UngroupedPlacement::Pregame).len(), 3);
        assert!(timeline.ungrouped_at(UngroupedPlacement::Postgame).is_empty());
    }
}
