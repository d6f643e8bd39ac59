use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use gamecast::commands;
use gamecast::commands::timeline::TimelineOptions;
use gamecast::config;
use gamecast::preferences::FilePreferences;

// Default Configuration Constants
/// Default log level when not specified
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file path (no logging to file)
const DEFAULT_LOG_FILE: &str = "/dev/null";

#[derive(Parser)]
#[command(name = "gamecast")]
#[command(about = "Game timeline viewer", long_about = "Game timeline viewer\n\nMerges play-by-play, social posts and odds movement into one timeline per period.")]
struct Cli {
    /// Set log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Log file path (default: /dev/null for no logging)
    #[arg(short = 'F', long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the timeline for a game
    Timeline {
        /// Game ID (e.g., 2024020001)
        game_id: String,

        /// League code: nba, wnba, ncaab or nhl
        #[arg(short, long, default_value = "nhl")]
        league: String,

        /// Include social posts for this game (remembered)
        #[arg(short, long)]
        social: bool,

        /// Show every period expanded
        #[arg(short, long)]
        expand_all: bool,
    },
    /// Display current configuration
    Config,
}

fn init_logging(log_level: &str, log_file: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file, e);
            return;
        }
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Handle the config command - display current configuration
fn handle_config_command() {
    let cfg = config::read();

    let (path_str, exists) = match config::get_config_path() {
        Some(path) => {
            let exists = path.exists();
            (path.display().to_string(), exists)
        }
        None => ("Unable to determine config path".to_string(), false),
    };
    let preferences_path = match FilePreferences::open_default(cfg.social.default_opt_in) {
        Ok(preferences) => preferences.path().display().to_string(),
        Err(e) => e.to_string(),
    };

    println!("Configuration File: {} (Exists: {})", path_str, if exists { "yes" } else { "no" });
    println!("Preferences File: {}", preferences_path);
    println!();
    println!("Current Configuration:");
    println!("=====================");
    println!("log_level: {}", cfg.log_level);
    println!("log_file: {}", cfg.log_file);
    println!("time_format: {}", cfg.time_format);
    println!("use_unicode: {}", cfg.use_unicode);
    println!();
    println!("[scroll]");
    println!("section_offset_band: {} rows", cfg.scroll.section_offset_band);
    println!("resume_tolerance: {} rows", cfg.scroll.resume_tolerance);
    println!();
    println!("[timeline]");
    println!("correlate_posts_by_time: {}", cfg.timeline.correlate_posts_by_time);
    println!();
    println!("[social]");
    println!("default_opt_in: {}", cfg.social.default_opt_in);
}

/// Resolve log configuration from CLI args and config file
/// CLI arguments take precedence over config file
fn resolve_log_config<'a>(cli: &'a Cli, config: &'a config::Config) -> (&'a str, &'a str) {
    let log_level = if cli.log_level != DEFAULT_LOG_LEVEL {
        cli.log_level.as_str()
    } else {
        config.log_level.as_str()
    };

    let log_file = if cli.log_file != DEFAULT_LOG_FILE {
        cli.log_file.as_str()
    } else {
        config.log_file.as_str()
    };

    (log_level, log_file)
}

/// Execute a CLI command by routing it to the appropriate command handler
async fn execute_command(command: Commands, config: &config::Config) -> anyhow::Result<()> {
    match command {
        Commands::Config => unreachable!("Config command should be handled before execute_command"),
        Commands::Timeline {
            game_id,
            league,
            social,
            expand_all,
        } => {
            let league = commands::parse_league(&league)?;
            let options = TimelineOptions { social, expand_all };
            commands::timeline::run(&game_id, league, config, options).await
        }
    }
}

#[tokio::main]
async fn main() {
    let config = config::read();
    let cli = Cli::parse();

    // Resolve and initialize logging
    let (log_level, log_file) = resolve_log_config(&cli, &config);
    if log_file != DEFAULT_LOG_FILE {
        init_logging(log_level, log_file);
    }

    // Handle Config command separately (doesn't touch any game data)
    if let Commands::Config = cli.command {
        handle_config_command();
        return;
    }

    if let Err(e) = execute_command(cli.command, &config).await {
        eprintln!("Error: {:#}", e);
        tracing::error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}
