use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::types::{OddsEntry, PlayEntry, SocialPostEntry};

use super::classify::{classify_odds, classify_play, classify_post};
use super::{AggregatedTimeline, EventKind, PeriodGroup, TimelineEvent};

/// Tuning for the aggregator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Give period-less posts the period of the latest play posted before them,
    /// when both carry wall-clock timestamps
    pub correlate_posts_by_time: bool,
}

/// Merge the three event streams into period groups plus ungrouped posts
///
/// Plays take sequence indices `0..plays.len()` in input order, followed by
/// posts and then odds updates, each in input order. Grouping is by period;
/// within a group the sequence order is preserved, so a period lists its plays
/// first and the posts and odds that share the period after them.
pub fn aggregate(
    plays: &[PlayEntry],
    posts: &[SocialPostEntry],
    odds: &[OddsEntry],
) -> AggregatedTimeline {
    aggregate_with(plays, posts, odds, &AggregateOptions::default())
}

pub fn aggregate_with(
    plays: &[PlayEntry],
    posts: &[SocialPostEntry],
    odds: &[OddsEntry],
    options: &AggregateOptions,
) -> AggregatedTimeline {
    let mut events: Vec<TimelineEvent> = Vec::with_capacity(plays.len() + posts.len() + odds.len());
    let mut next_index: u32 = 0;

    for play in plays {
        events.push(classify_play(next_index, play));
        next_index += 1;
    }

    let anchors = if options.correlate_posts_by_time {
        play_time_anchors(&events)
    } else {
        Vec::new()
    };

    for post in posts {
        let mut event = classify_post(next_index, post);
        next_index += 1;
        if event.period.is_none() && event.kind() == EventKind::SocialPost {
            if let Some(posted_at) = event.timestamp {
                event.period = correlated_period(&anchors, posted_at);
            }
        }
        events.push(event);
    }

    for update in odds {
        events.push(classify_odds(next_index, update));
        next_index += 1;
    }

    let mut by_period: BTreeMap<u32, Vec<TimelineEvent>> = BTreeMap::new();
    let mut ungrouped = Vec::new();
    let mut dropped = 0;

    // `events` is already in sequence order, so every bucket stays sorted
    for event in events {
        match event.period {
            Some(period) => by_period.entry(period).or_default().push(event),
            None if event.kind() == EventKind::SocialPost => ungrouped.push(event),
            None => dropped += 1,
        }
    }

    let groups: Vec<PeriodGroup> = by_period
        .into_iter()
        .map(|(period, events)| PeriodGroup { period, events })
        .collect();

    debug!(
        "TIMELINE: Aggregated {} plays, {} posts, {} odds into {} groups ({} ungrouped, {} dropped)",
        plays.len(),
        posts.len(),
        odds.len(),
        groups.len(),
        ungrouped.len(),
        dropped
    );

    AggregatedTimeline {
        groups,
        ungrouped,
        dropped,
    }
}

/// Every period key except the smallest one
///
/// This is the "first period expanded, all others collapsed" policy. Applying
/// it only once per session is the caller's job (see `PeriodExpansion`).
pub fn default_collapsed_periods(groups: &[PeriodGroup]) -> BTreeSet<u32> {
    let first = groups.iter().map(|g| g.period).min();
    groups
        .iter()
        .map(|g| g.period)
        .filter(|period| Some(*period) != first)
        .collect()
}

/// (timestamp, period) of timestamped plays, sorted by timestamp
fn play_time_anchors(events: &[TimelineEvent]) -> Vec<(DateTime<Utc>, u32)> {
    let mut anchors: Vec<(DateTime<Utc>, u32)> = events
        .iter()
        .filter(|e| e.is_play())
        .filter_map(|e| Some((e.timestamp?, e.period?)))
        .collect();
    anchors.sort_by_key(|(at, _)| *at);
    anchors
}

/// Period of the latest play at or before `posted_at`; None outside the game span
fn correlated_period(anchors: &[(DateTime<Utc>, u32)], posted_at: DateTime<Utc>) -> Option<u32> {
    let (first, _) = anchors.first()?;
    let (last, _) = anchors.last()?;
    if posted_at < *first || posted_at > *last {
        return None;
    }
    let idx = anchors.partition_point(|(at, _)| *at <= posted_at);
    anchors.get(idx.checked_sub(1)?).map(|(_, period)| *period)
}
