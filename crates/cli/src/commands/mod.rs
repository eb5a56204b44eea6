//! CLI command implementations and shared wiring.

pub mod brief;
pub mod calendar;
pub mod chat;
pub mod config_cmd;

use std::sync::Arc;

use deskmate_collaborators::Collaborators;
use deskmate_config::AppConfig;
use deskmate_core::collaborator::SourceTag;
use deskmate_engine::{
    BriefingThresholds, ChatEngine, ContextAssembler, ProactiveMonitor, RoutingTable,
    DEFAULT_PERSONA,
};

/// Build the full chat engine from configuration.
pub fn build_engine(config: &AppConfig) -> ChatEngine {
    let Collaborators {
        lms,
        calendar,
        search,
        weather,
    } = deskmate_collaborators::build_from_config(config);

    let assembler = ContextAssembler::new(lms.clone(), calendar.clone(), search, weather)
        .with_weather_location(&config.weather.location)
        .with_max_section_chars(config.context.max_section_chars);

    let monitor = ProactiveMonitor::new(lms, calendar, thresholds(config));
    let generator = Arc::new(deskmate_providers::build_from_config(config));

    ChatEngine::new(routing_table(config), assembler, monitor, generator)
        .with_persona(config.persona.as_deref().unwrap_or(DEFAULT_PERSONA))
}

/// Map briefing config onto the monitor thresholds.
pub fn thresholds(config: &AppConfig) -> BriefingThresholds {
    BriefingThresholds {
        score_cutoff: config.briefing.score_cutoff,
        due_soon_days: config.briefing.due_soon_days,
        density_cutoff: config.briefing.density_cutoff,
    }
}

/// The built-in routing table extended with any configured triggers.
pub fn routing_table(config: &AppConfig) -> RoutingTable {
    let mut table = RoutingTable::new();
    for (category, terms) in &config.extra_triggers {
        let tag = match category.as_str() {
            "academic" => SourceTag::Academic,
            "calendar" => SourceTag::Calendar,
            "search" => SourceTag::Search,
            "weather" => SourceTag::Weather,
            other => {
                tracing::warn!(category = other, "Unknown trigger category in config, skipping");
                continue;
            }
        };
        let terms: Vec<&str> = terms.iter().map(String::as_str).collect();
        table = table.with_triggers(tag, &terms);
    }
    table
}
