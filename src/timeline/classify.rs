use crate::types::{OddsEntry, PlayEntry, SocialPostEntry};

use super::{EventPayload, EventSource, TimelineEvent};

/// Treat blank strings the same as missing fields
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Period 0 is what some feeds send for "no period"
fn normalize_period(period: Option<u32>) -> Option<u32> {
    period.filter(|p| *p > 0)
}

pub fn classify_play(sequence_index: u32, play: &PlayEntry) -> TimelineEvent {
    let play_type = non_blank(&play.play_type);
    let description = non_blank(&play.description);

    let payload = match (&description, &play_type) {
        (None, None) => EventPayload::Unknown,
        _ => EventPayload::Play {
            description: description.or_else(|| play_type.clone()).unwrap_or_default(),
            play_type,
            team: non_blank(&play.team),
            player: non_blank(&play.player),
        },
    };

    TimelineEvent {
        sequence_index,
        source: EventSource::Plays,
        period: normalize_period(play.period),
        timestamp: play.wall_clock,
        game_clock: non_blank(&play.game_clock),
        home_score: play.home_score,
        away_score: play.away_score,
        payload,
    }
}

pub fn classify_post(sequence_index: u32, post: &SocialPostEntry) -> TimelineEvent {
    let text = non_blank(&post.text);
    let media_url = non_blank(&post.media_url);

    let payload = if text.is_none() && media_url.is_none() {
        EventPayload::Unknown
    } else {
        EventPayload::SocialPost {
            handle: non_blank(&post.handle),
            text,
            media_url,
        }
    };

    TimelineEvent {
        sequence_index,
        source: EventSource::SocialPosts,
        period: normalize_period(post.period),
        timestamp: post.posted_at,
        game_clock: None,
        home_score: None,
        away_score: None,
        payload,
    }
}

pub fn classify_odds(sequence_index: u32, odds: &OddsEntry) -> TimelineEvent {
    let payload = match non_blank(&odds.line) {
        Some(line) => EventPayload::Odds {
            market: non_blank(&odds.market),
            line,
        },
        None => EventPayload::Unknown,
    };

    TimelineEvent {
        sequence_index,
        source: EventSource::Odds,
        period: normalize_period(odds.period),
        timestamp: odds.updated_at,
        game_clock: None,
        home_score: None,
        away_score: None,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::EventKind;

    #[test]
    fn test_play_with_description_is_play() {
        let play = PlayEntry {
            period: Some(1),
            description: Some("Goal by Marchand".to_string()),
            home_score: Some(1),
            away_score: Some(0),
            ..Default::default()
        };
        let event = classify_play(4, &play);
        assert_eq!(event.kind(), EventKind::Play);
        assert_eq!(event.sequence_index, 4);
        assert_eq!(event.score(), Some((1, 0)));
    }

    #[test]
    fn test_play_type_only_uses_type_as_description() {
        let play = PlayEntry {
            period: Some(2),
            play_type: Some("timeout".to_string()),
            ..Default::default()
        };
        let event = classify_play(0, &play);
        match event.payload {
            EventPayload::Play { description, .. } => assert_eq!(description, "timeout"),
            other => panic!("Expected play payload, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_play_is_unknown_but_keeps_period() {
        let play = PlayEntry {
            period: Some(3),
            description: Some("   ".to_string()),
            ..Default::default()
        };
        let event = classify_play(9, &play);
        assert_eq!(event.kind(), EventKind::Unknown);
        assert_eq!(event.source, EventSource::Plays);
        assert_eq!(event.period, Some(3));
    }

    #[test]
    fn test_period_zero_means_no_period() {
        let post = SocialPostEntry {
            period: Some(0),
            text: Some("Warmups".to_string()),
            ..Default::default()
        };
        assert_eq!(classify_post(0, &post).period, None);
    }

    #[test]
    fn test_media_only_post_is_post() {
        let post = SocialPostEntry {
            media_url: Some("https://video.example/clip.mp4".to_string()),
            ..Default::default()
        };
        assert_eq!(classify_post(0, &post).kind(), EventKind::SocialPost);
    }

    #[test]
    fn test_odds_without_line_is_unknown() {
        let odds = OddsEntry {
            period: Some(1),
            market: Some("spread".to_string()),
            ..Default::default()
        };
        assert_eq!(classify_odds(0, &odds).kind(), EventKind::Unknown);
    }
}
