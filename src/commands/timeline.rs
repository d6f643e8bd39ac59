use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::dev::mock_client::MockClient;
use crate::formatting::{format_event_row, format_game_line, format_header, format_period_header, BoxChars};
use crate::preferences::{FilePreferences, MemoryPreferences, Preferences};
use crate::screen::{Action, Availability, DataEffects, Runtime, ScreenSnapshot, ScreenState, SliceStatus};
use crate::timeline::UngroupedPlacement;
use crate::types::{DataSlice, League};

/// How long the command waits for every slice to settle
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineOptions {
    /// Opt in to social posts for this game (persisted)
    pub social: bool,
    /// Print every period expanded, ignoring the default collapse
    pub expand_all: bool,
}

fn open_preferences(config: &Config) -> Arc<dyn Preferences> {
    match FilePreferences::open_default(config.social.default_opt_in) {
        Ok(preferences) => {
            info!("PREFS: Using {}", preferences.path().display());
            Arc::new(preferences)
        }
        Err(e) => {
            warn!("PREFS: {}; preferences will not be saved", e);
            Arc::new(MemoryPreferences::new(config.social.default_opt_in))
        }
    }
}

/// Open a game from fixture data and print its timeline
pub async fn run(raw_id: &str, league: League, config: &Config, options: TimelineOptions) -> Result<()> {
    let data_effects = Arc::new(DataEffects::new(
        Arc::new(MockClient::new()),
        open_preferences(config),
    ));
    let mut runtime = Runtime::new(ScreenState::new(config), data_effects);

    runtime.dispatch(Action::OpenGameLink {
        raw_id: raw_id.to_string(),
        league,
    });
    runtime.run_until_idle(LOAD_TIMEOUT).await;

    if let Availability::Unavailable(reason) = &runtime.snapshot().availability {
        bail!("{}", reason);
    }

    if options.social && !runtime.snapshot().social_opt_in {
        runtime.dispatch(Action::SetSocialOptIn(true));
        runtime.run_until_idle(LOAD_TIMEOUT).await;
    }
    if options.expand_all {
        runtime.dispatch(Action::ExpandAllPeriods);
    }

    print!("{}", format_timeline(&runtime.snapshot(), config));
    Ok(())
}

fn slice_problem(snapshot: &ScreenSnapshot, slice: DataSlice) -> Option<String> {
    match snapshot.slice_status(slice) {
        SliceStatus::Failed(error) => Some(error),
        SliceStatus::Loading => Some(format!("Still loading {}", slice)),
        SliceStatus::NotRequested | SliceStatus::Loaded => None,
    }
}

fn push_posts(
    output: &mut String,
    snapshot: &ScreenSnapshot,
    placement: UngroupedPlacement,
    title: &str,
    config: &Config,
    box_chars: &BoxChars,
) {
    let posts = snapshot.timeline.ungrouped_at(placement);
    if posts.is_empty() {
        return;
    }
    output.push_str(&format!("{}\n", title));
    for event in posts {
        output.push_str(&format!("  {}\n", format_event_row(event, &config.time_format, box_chars)));
    }
}

/// Render a snapshot the way the game screen lays it out, top to bottom
pub fn format_timeline(snapshot: &ScreenSnapshot, config: &Config) -> String {
    let box_chars = BoxChars::from_use_unicode(config.use_unicode);
    let mut output = String::new();

    let (league, playoffs) = match snapshot.game.as_ref() {
        Some(game) => {
            output.push_str(&format_header(&format_game_line(game), true, &box_chars));
            if let Some(venue) = &game.venue {
                output.push_str(&format!("{}\n", venue));
            }
            (game.league, game.playoffs)
        }
        None => {
            if let Some(error) = slice_problem(snapshot, DataSlice::Game) {
                output.push_str(&format!("{}\n", error));
            }
            let league = snapshot.request.map(|r| r.league).unwrap_or(League::Nhl);
            (league, false)
        }
    };

    match snapshot.story.as_ref() {
        Some(story) => {
            output.push('\n');
            output.push_str(&format_header(&story.headline, false, &box_chars));
            for paragraph in &story.paragraphs {
                output.push_str(&format!("{}\n", paragraph));
            }
        }
        None => {
            if let Some(error) = slice_problem(snapshot, DataSlice::Story) {
                output.push_str(&format!("\n{}\n", error));
            }
        }
    }

    output.push('\n');
    output.push_str(&format_header("Timeline", true, &box_chars));
    if let Some(error) = slice_problem(snapshot, DataSlice::Timeline) {
        output.push_str(&format!("{}\n", error));
    }

    push_posts(&mut output, snapshot, UngroupedPlacement::Pregame, "Pregame", config, &box_chars);

    for group in snapshot.groups() {
        let collapsed = snapshot.is_collapsed(group.period);
        output.push_str(&format_period_header(group, league, playoffs, collapsed, &box_chars));
        output.push('\n');
        if collapsed {
            continue;
        }
        for event in &group.events {
            let row = format_event_row(event, &config.time_format, &box_chars);
            if snapshot.resume_marker == Some(event.sequence_index) {
                output.push_str(&format!("  {}  <- last read\n", row));
            } else {
                output.push_str(&format!("  {}\n", row));
            }
        }
    }

    push_posts(&mut output, snapshot, UngroupedPlacement::InGame, "During the game", config, &box_chars);
    push_posts(&mut output, snapshot, UngroupedPlacement::Postgame, "Postgame", config, &box_chars);

    for slice in [DataSlice::SocialPosts, DataSlice::Odds] {
        if let Some(error) = slice_problem(snapshot, slice) {
            output.push_str(&format!("\n{}\n", error));
        }
    }
    output
}
