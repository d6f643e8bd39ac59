/// Mock fixture data for testing and development
///
/// Deterministic games used by:
/// 1. Unit and integration tests, so the timeline and screen see predictable input
/// 2. The command line, which runs against fixtures instead of a live feed
/// 3. Benchmarks, which need consistent and sizeable input
///
/// Hockey requests get a Bruins at Maple Leafs game decided in overtime.
/// Basketball requests get a Lakers at Celtics game in the fourth quarter.
/// Both carry pregame and postgame posts, odds movement and a few malformed
/// entries the classifier has to cope with.
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::types::{
    GameRequest, GameStatus, GameSummary, League, OddsEntry, PlayEntry, SocialPostEntry, Sport,
    StoryPayload, TeamLine,
};

/// Game id used by the hockey fixture in docs and examples
pub const NHL_FIXTURE_GAME: u64 = 2024020001;

/// Game id used by the basketball fixture in docs and examples
pub const NBA_FIXTURE_GAME: u64 = 401585001;

/// Wall clock at the opening faceoff / tip-off, offset by `minutes`
fn at(minutes: i64) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, 10, 8, 23, 0, 0)
        .single()
        .map(|start| start + Duration::minutes(minutes))
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// Helper to create a mock play
#[allow(clippy::too_many_arguments)]
fn create_mock_play(
    period: u32,
    clock: &str,
    minute: i64,
    play_type: &str,
    description: &str,
    team: Option<&str>,
    player: Option<&str>,
    score: Option<(u32, u32)>,
) -> PlayEntry {
    PlayEntry {
        period: Some(period),
        game_clock: text(clock),
        wall_clock: at(minute),
        play_type: text(play_type),
        description: text(description),
        team: team.map(str::to_string),
        player: player.map(str::to_string),
        home_score: score.map(|(home, _)| home),
        away_score: score.map(|(_, away)| away),
    }
}

fn create_mock_post(
    period: Option<u32>,
    minute: i64,
    handle: &str,
    body: &str,
    media_url: Option<&str>,
) -> SocialPostEntry {
    SocialPostEntry {
        period,
        posted_at: at(minute),
        handle: text(handle),
        text: text(body),
        media_url: media_url.map(str::to_string),
    }
}

fn create_mock_odds(period: Option<u32>, minute: i64, market: &str, line: &str) -> OddsEntry {
    OddsEntry {
        period,
        market: text(market),
        line: text(line),
        updated_at: at(minute),
    }
}

/// Create the game summary for a request
pub fn create_mock_game_summary(request: GameRequest) -> GameSummary {
    match request.league.sport() {
        Sport::Hockey => GameSummary {
            id: request.id,
            league: request.league,
            home: create_team_line("TOR", "Toronto Maple Leafs", 3),
            away: create_team_line("BOS", "Boston Bruins", 2),
            status: GameStatus::Final,
            venue: text("Scotiabank Arena"),
            start_time: at(0),
            playoffs: false,
        },
        Sport::Basketball => GameSummary {
            id: request.id,
            league: request.league,
            home: create_team_line("BOS", "Boston Celtics", 104),
            away: create_team_line("LAL", "Los Angeles Lakers", 99),
            status: GameStatus::Live {
                period: request.league.regulation_periods(),
                clock: text("2:11"),
            },
            venue: text("TD Garden"),
            start_time: at(0),
            playoffs: false,
        },
    }
}

fn create_team_line(abbrev: &str, name: &str, score: u32) -> TeamLine {
    TeamLine {
        abbrev: abbrev.to_string(),
        name: name.to_string(),
        score: Some(score),
    }
}

/// Create play-by-play entries in source order
pub fn create_mock_plays(league: League) -> Vec<PlayEntry> {
    match league.sport() {
        Sport::Hockey => create_hockey_plays(),
        Sport::Basketball => fold_into_halves(league, create_basketball_plays()),
    }
}

fn create_hockey_plays() -> Vec<PlayEntry> {
    vec![
        create_mock_play(1, "20:00", 1, "faceoff", "Matthews wins faceoff against Zacha", Some("TOR"), Some("Auston Matthews"), None),
        create_mock_play(1, "15:12", 8, "shot-on-goal", "Marchand wrist shot saved by Woll", Some("BOS"), Some("Brad Marchand"), None),
        create_mock_play(1, "11:40", 13, "goal", "Matthews (1) snap shot, assists: Marner (1), Nylander (1)", Some("TOR"), Some("Auston Matthews"), Some((1, 0))),
        create_mock_play(1, "06:05", 20, "penalty", "Pastrnak 2 minutes for tripping", Some("BOS"), Some("David Pastrnak"), None),
        create_mock_play(2, "17:30", 45, "goal", "Pastrnak (1) one-timer, assist: Marchand (1)", Some("BOS"), Some("David Pastrnak"), Some((1, 1))),
        create_mock_play(2, "09:48", 55, "shot-on-goal", "Tavares backhand saved by Swayman", Some("TOR"), Some("John Tavares"), None),
        // Feed glitch: neither a description nor a play type
        PlayEntry {
            period: Some(2),
            game_clock: text("04:10"),
            ..Default::default()
        },
        create_mock_play(3, "14:02", 85, "goal", "Nylander (1) backhand, assist: Tavares (1)", Some("TOR"), Some("William Nylander"), Some((2, 1))),
        create_mock_play(3, "02:15", 100, "goal", "McAvoy (1) slap shot from the point", Some("BOS"), Some("Charlie McAvoy"), Some((2, 2))),
        create_mock_play(3, "00:00", 104, "period-end", "End of 3rd period", None, None, Some((2, 2))),
        create_mock_play(4, "03:21", 115, "goal", "Marner (1) wrist shot, game-winning goal", Some("TOR"), Some("Mitch Marner"), Some((3, 2))),
        // Period 0 means the feed lost track of the period
        PlayEntry {
            period: Some(0),
            play_type: text("game-end"),
            description: text("End of game"),
            ..Default::default()
        },
    ]
}

fn create_basketball_plays() -> Vec<PlayEntry> {
    vec![
        create_mock_play(1, "11:42", 1, "jump-shot", "Tatum 24' three point jumper", Some("BOS"), Some("Jayson Tatum"), Some((3, 0))),
        create_mock_play(1, "08:15", 6, "dunk", "Davis driving dunk", Some("LAL"), Some("Anthony Davis"), Some((9, 8))),
        create_mock_play(2, "10:01", 35, "timeout", "Lakers full timeout", Some("LAL"), None, None),
        create_mock_play(2, "00:01", 52, "jump-shot", "Brown 26' step back three", Some("BOS"), Some("Jaylen Brown"), Some((55, 50))),
        create_mock_play(3, "07:30", 78, "layup", "James driving layup", Some("LAL"), Some("LeBron James"), Some((70, 71))),
        // Feed glitch: neither a description nor a play type
        PlayEntry {
            period: Some(3),
            ..Default::default()
        },
        create_mock_play(4, "05:40", 112, "free-throw", "Holiday free throw 2 of 2", Some("BOS"), Some("Jrue Holiday"), Some((96, 95))),
        create_mock_play(4, "02:11", 118, "jump-shot", "White 25' three point jumper", Some("BOS"), Some("Derrick White"), Some((104, 99))),
    ]
}

/// Create social posts in source order
pub fn create_mock_social_posts(league: League) -> Vec<SocialPostEntry> {
    match league.sport() {
        Sport::Hockey => vec![
            create_mock_post(None, -30, "@MapleLeafs", "Lineup is set for opening night", None),
            create_mock_post(Some(1), 9, "@NHLBruins", "Woll robs Marchand point blank", Some("https://video.example/woll-save.mp4")),
            // Posted during the second period without a period tag
            create_mock_post(None, 50, "@SportsnetTO", "All square in the middle frame", None),
            create_mock_post(Some(3), 101, "@NHL", "McAvoy from the point ties it late", Some("https://video.example/mcavoy.mp4")),
            // Post with nothing to show
            SocialPostEntry {
                period: Some(3),
                handle: text("@bot"),
                ..Default::default()
            },
            create_mock_post(None, 130, "@MapleLeafs", "MITCH IN OT! Leafs take the opener", None),
        ],
        Sport::Basketball => fold_posts_into_halves(
            league,
            vec![
                create_mock_post(None, -45, "@celtics", "Banner night warmups underway", None),
                create_mock_post(Some(2), 53, "@NBA", "Brown beats the halftime buzzer", Some("https://video.example/brown-buzzer.mp4")),
                create_mock_post(Some(4), 119, "@Lakers", "Still time. Timeout LA.", None),
            ],
        ),
    }
}

/// Create odds movements in source order
pub fn create_mock_odds_updates(league: League) -> Vec<OddsEntry> {
    match league.sport() {
        Sport::Hockey => vec![
            // Pregame line without a period; never grouped
            create_mock_odds(None, -60, "moneyline", "TOR -150"),
            create_mock_odds(Some(1), 14, "moneyline", "TOR -190"),
            create_mock_odds(Some(2), 46, "moneyline", "TOR -120"),
            OddsEntry {
                period: Some(3),
                market: text("total"),
                line: None,
                updated_at: at(90),
            },
        ],
        Sport::Basketball => vec![
            create_mock_odds(Some(1), 7, "spread", "BOS -6.5"),
            create_mock_odds(Some(league.regulation_periods()), 113, "spread", "BOS -2.5"),
        ],
    }
}

/// Create the preview or recap for a request
pub fn create_mock_story(request: GameRequest) -> StoryPayload {
    match request.league.sport() {
        Sport::Hockey => StoryPayload {
            headline: "Marner wins it in overtime as Maple Leafs edge Bruins".to_string(),
            paragraphs: vec![
                "Mitch Marner scored 3:21 into overtime and the Toronto Maple Leafs beat the Boston Bruins 3-2 on opening night.".to_string(),
                "Charlie McAvoy tied it with 2:15 left in regulation before Marner finished a rush in the extra period.".to_string(),
            ],
            key_moments: vec![
                "Matthews opens the scoring in the first".to_string(),
                "McAvoy forces overtime late in the third".to_string(),
                "Marner ends it in overtime".to_string(),
            ],
        },
        Sport::Basketball => StoryPayload {
            headline: "Celtics and Lakers trade blows down the stretch".to_string(),
            paragraphs: vec![
                "Boston leads Los Angeles 104-99 with just over two minutes to play.".to_string(),
            ],
            key_moments: vec!["Brown beats the halftime buzzer".to_string()],
        },
    }
}

/// College basketball plays two halves; map quarter fixtures onto them
fn fold_into_halves(league: League, plays: Vec<PlayEntry>) -> Vec<PlayEntry> {
    if league.regulation_periods() != 2 {
        return plays;
    }
    plays
        .into_iter()
        .map(|play| PlayEntry {
            period: play.period.map(|p| p.div_ceil(2)),
            ..play
        })
        .collect()
}

fn fold_posts_into_halves(league: League, posts: Vec<SocialPostEntry>) -> Vec<SocialPostEntry> {
    if league.regulation_periods() != 2 {
        return posts;
    }
    posts
        .into_iter()
        .map(|post| SocialPostEntry {
            period: post.period.map(|p| p.div_ceil(2)),
            ..post
        })
        .collect()
}

/// Large synthetic timeline for benchmarks
pub fn create_large_plays(periods: u32, plays_per_period: u32) -> Vec<PlayEntry> {
    (1..=periods)
        .flat_map(|period| {
            (0..plays_per_period).map(move |n| PlayEntry {
                period: Some(period),
                game_clock: Some(format!("{:02}:{:02}", 19 - (n % 20), 59 - (n % 60))),
                wall_clock: at(i64::from(period * 25 + n / 4)),
                play_type: text("shot-on-goal"),
                description: Some(format!("Shot {} of period {}", n + 1, period)),
                ..Default::default()
            })
        })
        .collect()
}

/// Large synthetic post stream for benchmarks; every fifth post lacks a period
pub fn create_large_posts(periods: u32, posts_per_period: u32) -> Vec<SocialPostEntry> {
    (1..=periods)
        .flat_map(|period| {
            (0..posts_per_period).map(move |n| SocialPostEntry {
                period: if n % 5 == 0 { None } else { Some(period) },
                posted_at: at(i64::from(period * 25 + n / 3)),
                handle: text("@fan"),
                text: Some(format!("Post {} in period {}", n + 1, period)),
                media_url: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameId;

    fn request(league: League) -> GameRequest {
        GameRequest::new(GameId::new(NHL_FIXTURE_GAME).unwrap(), league)
    }

    #[test]
    fn test_hockey_fixture_has_overtime() {
        let periods: Vec<_> = create_mock_plays(League::Nhl)
            .iter()
            .filter_map(|p| p.period)
            .collect();
        assert_eq!(periods.iter().max(), Some(&4));
        assert!(periods.contains(&0));
    }

    #[test]
    fn test_ncaab_fixture_uses_halves() {
        let plays = create_mock_plays(League::Ncaab);
        assert!(plays.iter().filter_map(|p| p.period).all(|p| p <= 2));
        let posts = create_mock_social_posts(League::Ncaab);
        assert!(posts.iter().filter_map(|p| p.period).all(|p| p <= 2));
    }

    #[test]
    fn test_summary_echoes_request() {
        let summary = create_mock_game_summary(request(League::Wnba));
        assert_eq!(summary.id.get(), NHL_FIXTURE_GAME);
        assert_eq!(summary.league, League::Wnba);
        assert!(summary.status.has_started());
    }

    #[test]
    fn test_fixture_timestamps_are_present() {
        assert!(at(0).is_some());
        assert!(create_mock_social_posts(League::Nhl)
            .iter()
            .filter(|p| p.text.is_some())
            .all(|p| p.posted_at.is_some()));
    }

    #[test]
    fn test_large_fixtures_sizes() {
        assert_eq!(create_large_plays(4, 50).len(), 200);
        assert_eq!(create_large_posts(3, 10).len(), 30);
    }
}
