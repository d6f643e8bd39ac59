use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use xdg::BaseDirectories;

use crate::layout_constants::{DEFAULT_RESUME_TOLERANCE, DEFAULT_SECTION_OFFSET_BAND};
use crate::timeline::AggregateOptions;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_file: String,
    pub time_format: String,
    /// Box-drawing characters in printed output; ASCII otherwise
    pub use_unicode: bool,
    pub scroll: ScrollConfig,
    pub timeline: TimelineConfig,
    pub social: SocialConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    /// Rows below the viewport top still counted when picking the active section
    pub section_offset_band: u16,
    /// Rows of drift from the saved position that do not warrant a resume prompt
    pub resume_tolerance: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TimelineConfig {
    pub correlate_posts_by_time: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SocialConfig {
    /// Opt-in used for games the user never decided on
    pub default_opt_in: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            log_file: "/dev/null".to_string(),
            time_format: "%H:%M".to_string(),
            use_unicode: true,
            scroll: ScrollConfig::default(),
            timeline: TimelineConfig::default(),
            social: SocialConfig::default(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            section_offset_band: DEFAULT_SECTION_OFFSET_BAND,
            resume_tolerance: DEFAULT_RESUME_TOLERANCE,
        }
    }
}

impl TimelineConfig {
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            correlate_posts_by_time: self.correlate_posts_by_time,
        }
    }
}

fn base_directories() -> BaseDirectories {
    BaseDirectories::with_prefix(env!("CARGO_PKG_NAME"))
}

pub fn get_config_path() -> Option<PathBuf> {
    let config_home = base_directories().get_config_home()?;
    Some(config_home.join("config.toml"))
}

/// Directory holding per-game preferences (resume markers, social opt-in)
pub fn get_data_dir() -> Option<PathBuf> {
    base_directories().get_data_home()
}

/// Whether chrono can format with `format` without failing
pub fn is_valid_time_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Parse a config document, falling back to defaults for missing keys
///
/// An unusable `time_format` is replaced by the default one.
pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    let mut config: Config = toml::from_str(content)?;
    if !is_valid_time_format(&config.time_format) {
        let fallback = Config::default().time_format;
        tracing::warn!(
            "CONFIG: Invalid time_format '{}'; using '{}'",
            config.time_format,
            fallback
        );
        config.time_format = fallback;
    }
    Ok(config)
}

pub fn read() -> Config {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => return Config::default(),
    };

    if !config_path.exists() {
        return Config::default();
    }

    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };

    parse(&content).unwrap_or_else(|e| {
        tracing::warn!("CONFIG: Ignoring malformed {}: {}", config_path.display(), e);
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.log_file, "/dev/null");
        assert!(config.use_unicode);
        assert_eq!(config.scroll.section_offset_band, DEFAULT_SECTION_OFFSET_BAND);
        assert_eq!(config.scroll.resume_tolerance, DEFAULT_RESUME_TOLERANCE);
        assert!(!config.timeline.correlate_posts_by_time);
        assert!(!config.social.default_opt_in);
    }

    #[test]
    fn test_config_from_toml_full() {
        let toml_str = r#"
log_level = "debug"
log_file = "/tmp/gamecast.log"
time_format = "%H:%M:%S"
use_unicode = false

[scroll]
section_offset_band = 3
resume_tolerance = 5

[timeline]
correlate_posts_by_time = true

[social]
default_opt_in = true
        "#;

        let config = parse(toml_str).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(!config.use_unicode);
        assert_eq!(config.scroll.section_offset_band, 3);
        assert_eq!(config.scroll.resume_tolerance, 5);
        assert!(config.timeline.correlate_posts_by_time);
        assert!(config.social.default_opt_in);
    }

    #[test]
    fn test_config_from_toml_partial_keeps_defaults() {
        let toml_str = r#"
[scroll]
resume_tolerance = 10
        "#;

        let config = parse(toml_str).unwrap();
        assert_eq!(config.scroll.resume_tolerance, 10);
        assert_eq!(config.scroll.section_offset_band, DEFAULT_SECTION_OFFSET_BAND);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_from_toml_wrong_type_is_error() {
        assert!(parse("[scroll]\nresume_tolerance = \"far\"").is_err());
    }

    #[test]
    fn test_invalid_time_format_falls_back_to_default() {
        let config = parse("time_format = \"%Q at %H\"").unwrap();
        assert_eq!(config.time_format, "%H:%M");

        let config = parse("time_format = \"%I:%M %p\"").unwrap();
        assert_eq!(config.time_format, "%I:%M %p");
    }

    #[test]
    fn test_is_valid_time_format() {
        assert!(is_valid_time_format("%H:%M"));
        assert!(is_valid_time_format("kickoff"));
        assert!(!is_valid_time_format("%Q"));
    }

    #[test]
    fn test_aggregate_options_follow_config() {
        let config = TimelineConfig {
            correlate_posts_by_time: true,
        };
        assert!(config.aggregate_options().correlate_posts_by_time);
    }

    #[test]
    fn test_config_path_is_named_after_package() {
        if let Some(path) = get_config_path() {
            assert!(path.ends_with("gamecast/config.toml"));
        }
    }
}
