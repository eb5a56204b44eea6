//! `deskmate add-event` — push an event to the calendar.

use anyhow::Context;
use chrono::{DateTime, Utc};
use deskmate_config::AppConfig;

pub async fn run(title: &str, start: &str) -> anyhow::Result<()> {
    let start: DateTime<Utc> = start
        .parse()
        .with_context(|| format!("'{start}' is not an ISO-8601 timestamp"))?;

    let config = AppConfig::load().context("Failed to load config")?;
    let collaborators = deskmate_collaborators::build_from_config(&config);

    let confirmation = collaborators
        .calendar
        .add_event(title, start)
        .await
        .context("Calendar push failed")?;

    println!("{confirmation}");
    Ok(())
}
