//! Funnel application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialise tracing
//! 3. Build the configured recording sink and a page session
//! 4. Replay the scripted host events, printing UI effects as JSON lines

mod cli;
mod replay;

use std::time::Duration;

use clap::Parser;
use funnel_core::config::{FunnelConfig, SinkKind};
use funnel_core::error::FunnelError;
use funnel_page::menu::TOGGLED_CLASSES;
use funnel_page::{Effect, PageContext, PageSession};
use funnel_tracking::{build_sink, EventTracker};

use cli::{CliArgs, Command, ReplayArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let config = FunnelConfig::load_or_default(&config_file);

    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting funnel v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Replay(replay_args) => run_replay(&config, replay_args).await?,
        Command::DefaultConfig => print!("{}", FunnelConfig::default().to_toml_string()?),
    }
    Ok(())
}

async fn run_replay(config: &FunnelConfig, args: ReplayArgs) -> Result<(), FunnelError> {
    let content = std::fs::read_to_string(&args.script)?;
    let script = replay::parse_script(&content)?;

    if matches!(config.tracking.sink, SinkKind::Ga4 | SinkKind::Pixel) {
        tracing::warn!(
            sink = ?config.tracking.sink,
            "Remote provider has no transport during replay, events will be skipped"
        );
    }
    let tracker = EventTracker::new(build_sink(config.tracking.sink, None));
    let context = PageContext::new(&args.url, &args.title, &args.referrer)?;

    let mut session = PageSession::new(context, config, tracker);
    if args.menu {
        session = session.with_mobile_menu();
    }
    tracing::info!(
        session = %session.id(),
        lines = script.len(),
        script = %args.script.display(),
        "Replaying session"
    );

    let settle = Duration::from_millis(
        config
            .scroll
            .debounce_ms
            .max(config.forms.reenable_delay_ms),
    ) + Duration::from_millis(10);
    let effects = replay::replay(&mut session, &script, settle).await;

    for effect in &effects {
        if let Effect::MenuToggled { open } = effect {
            for (selector, class) in TOGGLED_CLASSES {
                tracing::debug!(selector, class, enabled = *open, "Menu class");
            }
        }
        println!("{}", serde_json::to_string(effect)?);
    }

    tracing::info!(
        effects = effects.len(),
        milestones = ?session.reached_milestones(),
        "Replay finished"
    );
    Ok(())
}
