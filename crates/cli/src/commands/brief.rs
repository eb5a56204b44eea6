//! `deskmate brief` — run the proactive audit once and print the outcome.

use anyhow::Context;
use deskmate_config::AppConfig;
use deskmate_core::session::Session;
use deskmate_engine::{MonitorState, ProactiveMonitor};

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    if !config.briefing.enabled {
        println!("Proactive briefing is disabled in config.");
        return Ok(());
    }

    let collaborators = deskmate_collaborators::build_from_config(&config);
    let mut monitor = ProactiveMonitor::new(
        collaborators.lms,
        collaborators.calendar,
        super::thresholds(&config),
    );

    let mut session = Session::new();
    match monitor.evaluate(&mut session).await {
        MonitorState::Briefed => {
            // Exactly one injected assistant turn.
            if let Some(turn) = session.turns().last() {
                println!("{}", turn.text);
            }
        }
        MonitorState::Silent => println!("Nothing to report — no threshold condition holds."),
        MonitorState::Uninitialized => unreachable!("evaluate always settles the state"),
    }

    Ok(())
}
