//! card_draw: interactive entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use card_draw::app::{run, AppConfig};
use card_draw::gesture::DeadZone;
use card_settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};

#[derive(Parser)]
#[command(name = "card_draw")]
#[command(about = "Spin a ring of cards and draw one, by key, mouse or hand", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/card_draw/settings.json)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Number of cards in the pool (3–20)
    #[arg(long)]
    cards: Option<usize>,

    /// Rotation speed multiplier (0.5–3.0)
    #[arg(long)]
    speed: Option<f64>,

    /// Take each drawn card out of the pool
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    remove_drawn: Option<bool>,

    /// Set the text of card ID, e.g. --label 3="Free coffee"
    #[arg(long = "label", value_name = "ID=TEXT", value_parser = parse_label)]
    labels: Vec<(u32, String)>,

    /// Start from the default settings
    #[arg(long)]
    reset_settings: bool,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_settings: bool,

    /// Start with hand tracking on
    #[arg(long)]
    gesture: bool,

    /// Hand steering dead zone: tight, relaxed or a half-width in 0.0–0.49
    #[arg(long, default_value = "tight", value_parser = parse_dead_zone)]
    dead_zone: DeadZone,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn parse_label(s: &str) -> Result<(u32, String), String> {
    let (id, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=TEXT, got `{}`", s))?;
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad card id `{}`: {}", id, e))?;
    Ok((id, text.to_string()))
}

fn parse_dead_zone(s: &str) -> Result<DeadZone, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "tight"   => Ok(DeadZone::Tight),
        "relaxed" => Ok(DeadZone::Relaxed),
        other => other
            .parse::<f32>()
            .ok()
            .filter(|w| w.is_finite() && (0.0..0.5).contains(w))
            .map(DeadZone::Custom)
            .ok_or_else(|| format!("expected tight, relaxed or a width in 0.0–0.49, got `{}`", s)),
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_store(path: Option<PathBuf>) -> Box<dyn SettingsStore> {
    match path.map(JsonFileStore::new).or_else(JsonFileStore::default_location) {
        Some(store) => {
            tracing::info!(path = %store.path().display(), "settings file");
            Box::new(store)
        }
        None => {
            tracing::warn!("no config directory; settings will not be kept after exit");
            Box::new(MemoryStore::default())
        }
    }
}

/// Apply command-line overrides.  Returns whether anything changed.
fn apply_overrides(cli: &Cli, settings: &mut Settings) -> bool {
    let before = settings.clone();
    if let Some(cards) = cli.cards {
        settings.set_card_count(cards);
    }
    if let Some(speed) = cli.speed {
        settings.set_speed_multiplier(speed);
    }
    if let Some(remove) = cli.remove_drawn {
        settings.set_remove_drawn_card(remove);
    }
    for (id, text) in &cli.labels {
        if !settings.set_label_text(*id, text) {
            tracing::warn!(id, "no card with this id; label ignored");
        }
    }
    *settings != before
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    #[cfg(feature = "leap")]
    tracing::info!("hand tracking: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    tracing::info!("hand tracking: simulated (use --features leap for hardware)");

    let mut store = open_store(cli.settings.clone());
    let mut settings = if cli.reset_settings {
        Settings::default()
    } else {
        Settings::load(store.as_ref())
    };

    if apply_overrides(&cli, &mut settings) || cli.reset_settings {
        settings.save(store.as_mut()).context("saving settings")?;
    }

    if cli.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings.to_record())?);
        return Ok(());
    }

    let cfg = AppConfig {
        dead_zone: cli.dead_zone,
        gestures:  cli.gesture,
    };
    run(cfg, settings, store)
}
